//! Identities
//!
//! Identities are the parties of the exchange: data owners who upload
//! datasets and give consent, and app owners who request grants.

use super::app::{self, App, AppFilter};
use super::consent::{self, Consent, ConsentFilter, CreateConsentParams};
use super::dataset::{self, Dataset, DatasetFilter};
use crate::error::Result;
use crate::gateway::transport::SharedHttp;
use crate::resource::collection::{self, Resource};
use crate::resource::endpoint;
use crate::resource::filter::{Filter, Matcher};
use crate::resource::id::IdentityId;
use crate::resource::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) const PLURAL: &str = "identities";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityData {
    pub id: IdentityId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdentityParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl CreateIdentityParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIdentityParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityFilter {
    pub name: Option<String>,
    pub page: PageRequest,
}

impl From<IdentityFilter> for Filter {
    fn from(f: IdentityFilter) -> Self {
        let mut filter = Filter::new();
        filter.set_opt("name", f.name.map(Matcher::Eq));
        f.page.apply(&mut filter);
        filter
    }
}

#[derive(Clone)]
pub struct Identity {
    http: SharedHttp,
    data: IdentityData,
}

impl Resource for Identity {
    type Data = IdentityData;
    const KIND: &'static str = "identity";

    fn from_data(http: SharedHttp, data: IdentityData) -> Self {
        Self { http, data }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Identity").field(&self.data).finish()
    }
}

impl Identity {
    pub fn id(&self) -> &IdentityId {
        &self.data.id
    }

    pub fn data(&self) -> &IdentityData {
        &self.data
    }

    pub fn into_data(self) -> IdentityData {
        self.data
    }

    pub async fn update(&mut self, params: &UpdateIdentityParams) -> Result<()> {
        let updated = update(&self.http, &self.data.id, params).await?;
        self.data = updated.data;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        delete(&self.http, &self.data.id).await
    }

    pub async fn consents(&self, filter: ConsentFilter) -> Result<Page<Consent>> {
        consent::list(&self.http, &self.data.id, filter).await
    }

    pub async fn create_consent(&self, params: &CreateConsentParams) -> Result<Consent> {
        consent::create(&self.http, &self.data.id, params).await
    }

    /// Apps owned by this identity
    pub async fn apps(&self, mut filter: AppFilter) -> Result<Page<App>> {
        filter.owner = Some(self.data.id.clone());
        app::list(&self.http, filter).await
    }

    /// Datasets owned by this identity
    pub async fn datasets(&self, mut filter: DatasetFilter) -> Result<Page<Dataset>> {
        filter.owner = Some(self.data.id.clone());
        dataset::list(&self.http, filter).await
    }
}

pub async fn create(http: &SharedHttp, params: &CreateIdentityParams) -> Result<Identity> {
    collection::create(http, &endpoint::collection(PLURAL), params).await
}

pub async fn get(http: &SharedHttp, id: &IdentityId) -> Result<Identity> {
    collection::get(http, &endpoint::item(PLURAL, id.as_str())?).await
}

pub async fn list(http: &SharedHttp, filter: impl Into<Filter>) -> Result<Page<Identity>> {
    collection::list(http, &endpoint::collection(PLURAL), &filter.into()).await
}

pub async fn update(
    http: &SharedHttp,
    id: &IdentityId,
    params: &UpdateIdentityParams,
) -> Result<Identity> {
    collection::update(http, &endpoint::item(PLURAL, id.as_str())?, params).await
}

pub async fn delete(http: &SharedHttp, id: &IdentityId) -> Result<()> {
    collection::delete(http, Identity::KIND, &endpoint::item(PLURAL, id.as_str())?).await
}
