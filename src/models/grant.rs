//! Grants
//!
//! A grant lets an app run jobs over one dataset. The gateway maintains the
//! list of participating identities; clients can read it but never write it.

use super::app::{self, App};
use super::dataset::{self, Dataset};
use crate::error::Result;
use crate::gateway::transport::SharedHttp;
use crate::resource::collection::{self, Resource};
use crate::resource::endpoint;
use crate::resource::filter::{Filter, Matcher};
use crate::resource::id::{AppId, DatasetId, GrantId, IdentityId};
use crate::resource::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const PLURAL: &str = "grants";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantData {
    pub id: GrantId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub app: AppId,
    pub dataset: DatasetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// System-controlled
    #[serde(default)]
    pub participants: Vec<IdentityId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGrantParams {
    pub app: AppId,
    pub dataset: DatasetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGrantParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct GrantFilter {
    pub app: Option<AppId>,
    pub dataset: Option<DatasetId>,
    pub page: PageRequest,
}

impl From<GrantFilter> for Filter {
    fn from(f: GrantFilter) -> Self {
        let mut filter = Filter::new();
        filter.set_opt("app", f.app.map(Matcher::equals));
        filter.set_opt("dataset", f.dataset.map(Matcher::equals));
        f.page.apply(&mut filter);
        filter
    }
}

#[derive(Clone)]
pub struct Grant {
    http: SharedHttp,
    data: GrantData,
}

impl Resource for Grant {
    type Data = GrantData;
    const KIND: &'static str = "grant";

    fn from_data(http: SharedHttp, data: GrantData) -> Self {
        Self { http, data }
    }
}

impl std::fmt::Debug for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Grant").field(&self.data).finish()
    }
}

impl Grant {
    pub fn id(&self) -> &GrantId {
        &self.data.id
    }

    pub fn data(&self) -> &GrantData {
        &self.data
    }

    pub fn into_data(self) -> GrantData {
        self.data
    }

    pub async fn update(&mut self, params: &UpdateGrantParams) -> Result<()> {
        let updated = update(&self.http, &self.data.id, params).await?;
        self.data = updated.data;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        delete(&self.http, &self.data.id).await
    }

    pub async fn app(&self) -> Result<App> {
        app::get(&self.http, &self.data.app).await
    }

    pub async fn dataset(&self) -> Result<Dataset> {
        dataset::get(&self.http, &self.data.dataset).await
    }
}

pub async fn create(http: &SharedHttp, params: &CreateGrantParams) -> Result<Grant> {
    collection::create(http, &endpoint::collection(PLURAL), params).await
}

pub async fn get(http: &SharedHttp, id: &GrantId) -> Result<Grant> {
    collection::get(http, &endpoint::item(PLURAL, id.as_str())?).await
}

pub async fn list(http: &SharedHttp, filter: impl Into<Filter>) -> Result<Page<Grant>> {
    collection::list(http, &endpoint::collection(PLURAL), &filter.into()).await
}

pub async fn update(http: &SharedHttp, id: &GrantId, params: &UpdateGrantParams) -> Result<Grant> {
    collection::update(http, &endpoint::item(PLURAL, id.as_str())?, params).await
}

pub async fn delete(http: &SharedHttp, id: &GrantId) -> Result<()> {
    collection::delete(http, Grant::KIND, &endpoint::item(PLURAL, id.as_str())?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::collection::testing::RecordingHttp;
    use serde_json::json;

    fn snapshot(description: &str) -> serde_json::Value {
        json!({
            "id": "grt_1",
            "createdAt": "2024-02-10T12:00:00Z",
            "app": "app_1",
            "dataset": "ds_1",
            "description": description,
            "expiresAt": "2025-02-10T12:00:00Z",
            "participants": ["idn_1", "idn_2"]
        })
    }

    #[test]
    fn test_snapshot_fields() {
        let data: GrantData = serde_json::from_value(snapshot("quarterly")).unwrap();
        assert_eq!(data.dataset, DatasetId::new("ds_1"));
        assert_eq!(
            data.participants,
            vec![IdentityId::new("idn_1"), IdentityId::new("idn_2")]
        );
        assert_eq!(
            data.expires_at,
            Some("2025-02-10T12:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
    }

    #[tokio::test]
    async fn test_update_never_sends_participants() {
        let mock = RecordingHttp::with_responses(vec![
            Ok(snapshot("quarterly")),
            Ok(snapshot("monthly")),
        ]);
        let http: SharedHttp = mock.clone();

        let mut grant = get(&http, &GrantId::new("grt_1")).await.unwrap();
        let params = UpdateGrantParams {
            description: Some("monthly".to_string()),
            ..Default::default()
        };
        grant.update(&params).await.unwrap();

        assert_eq!(grant.data().description.as_deref(), Some("monthly"));
        assert_eq!(grant.data().participants.len(), 2);
        assert_eq!(mock.calls()[1].body, Some(json!({ "description": "monthly" })));
    }
}
