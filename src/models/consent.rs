//! Consents
//!
//! A data owner's consent for an app to compute over some of their
//! datasets. Consents are nested under the consenting identity.

use super::app::{self, App};
use super::identity::{self, Identity};
use crate::error::Result;
use crate::gateway::transport::SharedHttp;
use crate::resource::collection::{self, Resource};
use crate::resource::endpoint;
use crate::resource::filter::{Filter, Matcher};
use crate::resource::id::{AppId, ConsentId, DatasetId, IdentityId};
use crate::resource::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PLURAL: &str = "consents";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentData {
    pub id: ConsentId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub identity: IdentityId,
    pub app: AppId,
    #[serde(default)]
    pub datasets: Vec<DatasetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsentParams {
    pub app: AppId,
    pub datasets: Vec<DatasetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConsentParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasets: Option<Vec<DatasetId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ConsentFilter {
    pub app: Option<AppId>,
    /// Any-of matcher over the consented datasets
    pub datasets: Option<Matcher>,
    pub page: PageRequest,
}

impl From<ConsentFilter> for Filter {
    fn from(f: ConsentFilter) -> Self {
        let mut filter = Filter::new();
        filter.set_opt("app", f.app.map(Matcher::equals));
        filter.set_opt("datasets", f.datasets);
        f.page.apply(&mut filter);
        filter
    }
}

#[derive(Clone)]
pub struct Consent {
    http: SharedHttp,
    data: ConsentData,
}

impl Resource for Consent {
    type Data = ConsentData;
    const KIND: &'static str = "consent";

    fn from_data(http: SharedHttp, data: ConsentData) -> Self {
        Self { http, data }
    }
}

impl std::fmt::Debug for Consent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Consent").field(&self.data).finish()
    }
}

impl Consent {
    pub fn id(&self) -> &ConsentId {
        &self.data.id
    }

    pub fn data(&self) -> &ConsentData {
        &self.data
    }

    pub fn into_data(self) -> ConsentData {
        self.data
    }

    pub async fn update(&mut self, params: &UpdateConsentParams) -> Result<()> {
        let updated = update(&self.http, &self.data.id, &self.data.identity, params).await?;
        self.data = updated.data;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        delete(&self.http, &self.data.id, &self.data.identity).await
    }

    pub async fn app(&self) -> Result<App> {
        app::get(&self.http, &self.data.app).await
    }

    pub async fn identity(&self) -> Result<Identity> {
        identity::get(&self.http, &self.data.identity).await
    }
}

fn collection_path(identity_id: &IdentityId) -> Result<String> {
    endpoint::nested_collection(identity::PLURAL, identity_id.as_str(), PLURAL)
}

fn item_path(id: &ConsentId, identity_id: &IdentityId) -> Result<String> {
    endpoint::nested_item(identity::PLURAL, identity_id.as_str(), PLURAL, id.as_str())
}

pub async fn create(
    http: &SharedHttp,
    identity_id: &IdentityId,
    params: &CreateConsentParams,
) -> Result<Consent> {
    collection::create(http, &collection_path(identity_id)?, params).await
}

pub async fn get(http: &SharedHttp, id: &ConsentId, identity_id: &IdentityId) -> Result<Consent> {
    collection::get(http, &item_path(id, identity_id)?).await
}

pub async fn list(
    http: &SharedHttp,
    identity_id: &IdentityId,
    filter: impl Into<Filter>,
) -> Result<Page<Consent>> {
    collection::list(http, &collection_path(identity_id)?, &filter.into()).await
}

pub async fn update(
    http: &SharedHttp,
    id: &ConsentId,
    identity_id: &IdentityId,
    params: &UpdateConsentParams,
) -> Result<Consent> {
    collection::update(http, &item_path(id, identity_id)?, params).await
}

pub async fn delete(http: &SharedHttp, id: &ConsentId, identity_id: &IdentityId) -> Result<()> {
    collection::delete(http, Consent::KIND, &item_path(id, identity_id)?).await
}
