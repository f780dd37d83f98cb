//! Gateway Client
//!
//! Entry point for library users. Owns the shared transport and hands out
//! per-kind collection handles that forward to the model modules.

use super::auth::ApiToken;
use super::http::RestTransport;
use super::transport::SharedHttp;
use crate::config::Config;
use crate::error::Result;
use crate::models::app::{self, App, CreateAppParams, UpdateAppParams};
use crate::models::client::{self, Client, CreateClientParams, UpdateClientParams};
use crate::models::consent::{self, Consent, CreateConsentParams, UpdateConsentParams};
use crate::models::dataset::{self, Dataset, UpdateDatasetParams, UploadDatasetParams};
use crate::models::grant::{self, CreateGrantParams, Grant, UpdateGrantParams};
use crate::models::identity::{self, CreateIdentityParams, Identity, UpdateIdentityParams};
use crate::models::job::{self, CreateJobParams, Job};
use crate::resource::filter::Filter;
use crate::resource::id::{
    AppId, ClientId, ConsentId, DatasetId, GrantId, IdentityId, JobId,
};
use crate::resource::pagination::Page;
use crate::resource::stream::{Download, Upload, UploadData};
use std::sync::Arc;

/// Main gateway client
#[derive(Clone)]
pub struct CdxClient {
    http: SharedHttp,
}

impl CdxClient {
    /// Create a client for the gateway at `base_url`
    pub fn new(base_url: &str, token: Option<ApiToken>) -> Result<Self> {
        let transport = RestTransport::new(base_url, token)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Build a client from persisted config plus optional CLI overrides
    pub fn from_config(
        config: &Config,
        base_url: Option<&str>,
        token: Option<&str>,
    ) -> anyhow::Result<Self> {
        let base_url = config.effective_base_url(base_url);
        let token = config.effective_token(token)?;
        tracing::debug!("gateway {} (token: {})", base_url, token.is_some());

        let transport = RestTransport::with_timeout(&base_url, token, config.timeout())?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Use a custom transport, e.g. a test double
    pub fn with_transport(http: SharedHttp) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &SharedHttp {
        &self.http
    }

    pub fn identities(&self) -> Identities {
        Identities {
            http: self.http.clone(),
        }
    }

    pub fn apps(&self) -> Apps {
        Apps {
            http: self.http.clone(),
        }
    }

    pub fn grants(&self) -> Grants {
        Grants {
            http: self.http.clone(),
        }
    }

    pub fn datasets(&self) -> Datasets {
        Datasets {
            http: self.http.clone(),
        }
    }

    pub fn clients(&self, app_id: &AppId) -> Clients {
        Clients {
            http: self.http.clone(),
            app_id: app_id.clone(),
        }
    }

    pub fn jobs(&self, app_id: &AppId) -> Jobs {
        Jobs {
            http: self.http.clone(),
            app_id: app_id.clone(),
        }
    }

    pub fn consents(&self, identity_id: &IdentityId) -> Consents {
        Consents {
            http: self.http.clone(),
            identity_id: identity_id.clone(),
        }
    }

    pub fn upload_dataset(
        &self,
        data: impl Into<UploadData>,
        params: Option<UploadDatasetParams>,
    ) -> Upload<Dataset> {
        dataset::upload(&self.http, data, params)
    }

    pub fn download_dataset(&self, id: &DatasetId) -> Result<Download> {
        dataset::download(&self.http, id)
    }
}

/// `/identities`
pub struct Identities {
    http: SharedHttp,
}

impl Identities {
    pub async fn create(&self, params: &CreateIdentityParams) -> Result<Identity> {
        identity::create(&self.http, params).await
    }

    pub async fn get(&self, id: &IdentityId) -> Result<Identity> {
        identity::get(&self.http, id).await
    }

    pub async fn list(&self, filter: impl Into<Filter>) -> Result<Page<Identity>> {
        identity::list(&self.http, filter).await
    }

    pub async fn update(&self, id: &IdentityId, params: &UpdateIdentityParams) -> Result<Identity> {
        identity::update(&self.http, id, params).await
    }

    pub async fn delete(&self, id: &IdentityId) -> Result<()> {
        identity::delete(&self.http, id).await
    }
}

/// `/apps`
pub struct Apps {
    http: SharedHttp,
}

impl Apps {
    pub async fn create(&self, params: &CreateAppParams) -> Result<App> {
        app::create(&self.http, params).await
    }

    pub async fn get(&self, id: &AppId) -> Result<App> {
        app::get(&self.http, id).await
    }

    pub async fn list(&self, filter: impl Into<Filter>) -> Result<Page<App>> {
        app::list(&self.http, filter).await
    }

    pub async fn update(&self, id: &AppId, params: &UpdateAppParams) -> Result<App> {
        app::update(&self.http, id, params).await
    }

    pub async fn delete(&self, id: &AppId) -> Result<()> {
        app::delete(&self.http, id).await
    }
}

/// `/grants`
pub struct Grants {
    http: SharedHttp,
}

impl Grants {
    pub async fn create(&self, params: &CreateGrantParams) -> Result<Grant> {
        grant::create(&self.http, params).await
    }

    pub async fn get(&self, id: &GrantId) -> Result<Grant> {
        grant::get(&self.http, id).await
    }

    pub async fn list(&self, filter: impl Into<Filter>) -> Result<Page<Grant>> {
        grant::list(&self.http, filter).await
    }

    pub async fn update(&self, id: &GrantId, params: &UpdateGrantParams) -> Result<Grant> {
        grant::update(&self.http, id, params).await
    }

    pub async fn delete(&self, id: &GrantId) -> Result<()> {
        grant::delete(&self.http, id).await
    }
}

/// `/datasets`; new datasets come from [`CdxClient::upload_dataset`]
pub struct Datasets {
    http: SharedHttp,
}

impl Datasets {
    pub async fn get(&self, id: &DatasetId) -> Result<Dataset> {
        dataset::get(&self.http, id).await
    }

    pub async fn list(&self, filter: impl Into<Filter>) -> Result<Page<Dataset>> {
        dataset::list(&self.http, filter).await
    }

    pub async fn update(&self, id: &DatasetId, params: &UpdateDatasetParams) -> Result<Dataset> {
        dataset::update(&self.http, id, params).await
    }

    pub async fn delete(&self, id: &DatasetId) -> Result<()> {
        dataset::delete(&self.http, id).await
    }
}

/// `/apps/{appId}/clients`
pub struct Clients {
    http: SharedHttp,
    app_id: AppId,
}

impl Clients {
    pub async fn create(&self, params: &CreateClientParams) -> Result<Client> {
        client::create(&self.http, &self.app_id, params).await
    }

    pub async fn get(&self, id: &ClientId) -> Result<Client> {
        client::get(&self.http, id, &self.app_id).await
    }

    pub async fn list(&self, filter: impl Into<Filter>) -> Result<Page<Client>> {
        client::list(&self.http, &self.app_id, filter).await
    }

    pub async fn update(&self, id: &ClientId, params: &UpdateClientParams) -> Result<Client> {
        client::update(&self.http, id, &self.app_id, params).await
    }

    pub async fn delete(&self, id: &ClientId) -> Result<()> {
        client::delete(&self.http, id, &self.app_id).await
    }
}

/// `/apps/{appId}/jobs`; jobs cannot be updated
pub struct Jobs {
    http: SharedHttp,
    app_id: AppId,
}

impl Jobs {
    pub async fn create(&self, params: &CreateJobParams) -> Result<Job> {
        job::create(&self.http, &self.app_id, params).await
    }

    pub async fn get(&self, id: &JobId) -> Result<Job> {
        job::get(&self.http, id, &self.app_id).await
    }

    pub async fn list(&self, filter: impl Into<Filter>) -> Result<Page<Job>> {
        job::list(&self.http, &self.app_id, filter).await
    }

    pub async fn delete(&self, id: &JobId) -> Result<()> {
        job::delete(&self.http, id, &self.app_id).await
    }
}

/// `/identities/{identityId}/consents`
pub struct Consents {
    http: SharedHttp,
    identity_id: IdentityId,
}

impl Consents {
    pub async fn create(&self, params: &CreateConsentParams) -> Result<Consent> {
        consent::create(&self.http, &self.identity_id, params).await
    }

    pub async fn get(&self, id: &ConsentId) -> Result<Consent> {
        consent::get(&self.http, id, &self.identity_id).await
    }

    pub async fn list(&self, filter: impl Into<Filter>) -> Result<Page<Consent>> {
        consent::list(&self.http, &self.identity_id, filter).await
    }

    pub async fn update(&self, id: &ConsentId, params: &UpdateConsentParams) -> Result<Consent> {
        consent::update(&self.http, id, &self.identity_id, params).await
    }

    pub async fn delete(&self, id: &ConsentId) -> Result<()> {
        consent::delete(&self.http, id, &self.identity_id).await
    }
}
