//! Apps
//!
//! An app is the unit that requests access to datasets and runs compute
//! jobs over them. Apps own their OAuth-style clients and their jobs, which
//! live under `/apps/{id}/...`.

use super::client::{self, Client, ClientFilter, CreateClientParams};
use super::grant::{self, Grant, GrantFilter};
use super::identity::{self, Identity};
use super::job::{self, CreateJobParams, Job, JobFilter};
use crate::error::Result;
use crate::gateway::transport::SharedHttp;
use crate::resource::collection::{self, Resource};
use crate::resource::endpoint;
use crate::resource::filter::{Filter, Matcher};
use crate::resource::id::{AppId, IdentityId};
use crate::resource::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) const PLURAL: &str = "apps";

/// Wire schema of an app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub id: AppId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Identity that registered the app
    pub owner: IdentityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub published: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl CreateAppParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Fields left as `None` are not sent
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct AppFilter {
    pub owner: Option<IdentityId>,
    pub published: Option<bool>,
    /// `all:`/`any:` matcher over tags
    pub tags: Option<Matcher>,
    pub page: PageRequest,
}

impl From<AppFilter> for Filter {
    fn from(f: AppFilter) -> Self {
        let mut filter = Filter::new();
        filter.set_opt("owner", f.owner.map(Matcher::equals));
        filter.set_opt("published", f.published.map(Matcher::equals));
        filter.set_opt("tags", f.tags);
        f.page.apply(&mut filter);
        filter
    }
}

/// App model object
#[derive(Clone)]
pub struct App {
    http: SharedHttp,
    data: AppData,
}

impl Resource for App {
    type Data = AppData;
    const KIND: &'static str = "app";

    fn from_data(http: SharedHttp, data: AppData) -> Self {
        Self { http, data }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("App").field(&self.data).finish()
    }
}

impl App {
    pub fn id(&self) -> &AppId {
        &self.data.id
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn into_data(self) -> AppData {
        self.data
    }

    /// Update on the gateway and replace this object's snapshot with the answer
    pub async fn update(&mut self, params: &UpdateAppParams) -> Result<()> {
        let updated = update(&self.http, &self.data.id, params).await?;
        self.data = updated.data;
        Ok(())
    }

    pub async fn publish(&mut self) -> Result<()> {
        self.set_published(true).await
    }

    pub async fn unpublish(&mut self) -> Result<()> {
        self.set_published(false).await
    }

    async fn set_published(&mut self, published: bool) -> Result<()> {
        let params = UpdateAppParams {
            published: Some(published),
            ..Default::default()
        };
        self.update(&params).await
    }

    pub async fn delete(&self) -> Result<()> {
        delete(&self.http, &self.data.id).await
    }

    pub async fn owner(&self) -> Result<Identity> {
        identity::get(&self.http, &self.data.owner).await
    }

    pub async fn clients(&self, filter: ClientFilter) -> Result<Page<Client>> {
        client::list(&self.http, &self.data.id, filter).await
    }

    pub async fn create_client(&self, params: &CreateClientParams) -> Result<Client> {
        client::create(&self.http, &self.data.id, params).await
    }

    pub async fn jobs(&self, filter: JobFilter) -> Result<Page<Job>> {
        job::list(&self.http, &self.data.id, filter).await
    }

    pub async fn create_job(&self, params: &CreateJobParams) -> Result<Job> {
        job::create(&self.http, &self.data.id, params).await
    }

    /// Grants issued to this app
    pub async fn grants(&self, mut filter: GrantFilter) -> Result<Page<Grant>> {
        filter.app = Some(self.data.id.clone());
        grant::list(&self.http, filter).await
    }
}

pub async fn create(http: &SharedHttp, params: &CreateAppParams) -> Result<App> {
    collection::create(http, &endpoint::collection(PLURAL), params).await
}

pub async fn get(http: &SharedHttp, id: &AppId) -> Result<App> {
    collection::get(http, &endpoint::item(PLURAL, id.as_str())?).await
}

pub async fn list(http: &SharedHttp, filter: impl Into<Filter>) -> Result<Page<App>> {
    collection::list(http, &endpoint::collection(PLURAL), &filter.into()).await
}

pub async fn update(http: &SharedHttp, id: &AppId, params: &UpdateAppParams) -> Result<App> {
    collection::update(http, &endpoint::item(PLURAL, id.as_str())?, params).await
}

pub async fn delete(http: &SharedHttp, id: &AppId) -> Result<()> {
    collection::delete(http, App::KIND, &endpoint::item(PLURAL, id.as_str())?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::collection::testing::RecordingHttp;
    use serde_json::json;

    fn snapshot(published: bool) -> Value {
        json!({
            "id": "app_1",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T11:30:00.250Z",
            "owner": "idn_7",
            "name": "Cohort analysis",
            "description": "Joins two hospital datasets",
            "published": published,
            "tags": ["health", "research"],
            "metadata": { "tier": "gold" }
        })
    }

    #[test]
    fn test_snapshot_round_trip() {
        let value = snapshot(true);
        let data: AppData = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(data.id, AppId::new("app_1"));
        assert_eq!(data.owner.as_str(), "idn_7");
        assert_eq!(
            data.created_at,
            "2024-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(
            data.updated_at,
            Some("2024-03-02T11:30:00.250Z".parse::<DateTime<Utc>>().unwrap())
        );
        assert_eq!(data.name, "Cohort analysis");
        assert!(data.published);
        assert_eq!(data.tags, vec!["health", "research"]);
        assert_eq!(data.metadata.as_ref().unwrap()["tier"], "gold");

        let back: AppData = serde_json::from_value(serde_json::to_value(&data).unwrap()).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_optional_fields_stay_absent() {
        let data: AppData = serde_json::from_value(json!({
            "id": "app_2",
            "createdAt": "2024-03-01T10:00:00Z",
            "owner": "idn_7",
            "name": "bare"
        }))
        .unwrap();
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("description").is_none());
        assert!(value.get("updatedAt").is_none());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_filter_translation() {
        let filter: Filter = AppFilter {
            owner: Some(IdentityId::new("idn_7")),
            published: Some(false),
            tags: Some(Matcher::all_of(["tag1", "tag2"]).unwrap()),
            page: PageRequest::size(50),
        }
        .into();

        assert_eq!(
            filter.to_query(),
            vec![
                ("owner".to_string(), "idn_7".to_string()),
                ("page-size".to_string(), "50".to_string()),
                ("published".to_string(), "false".to_string()),
                ("tags".to_string(), "all:tag1,tag2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_replaces_snapshot_from_response() {
        let mock = RecordingHttp::with_responses(vec![
            Ok(snapshot(false)),
            // the gateway also changed the name; the object must follow it
            Ok(json!({
                "id": "app_1",
                "createdAt": "2024-03-01T10:00:00Z",
                "owner": "idn_7",
                "name": "Renamed by gateway",
                "published": true,
                "tags": []
            })),
        ]);
        let http: SharedHttp = mock.clone();

        let mut app = get(&http, &AppId::new("app_1")).await.unwrap();
        assert!(!app.data().published);

        app.publish().await.unwrap();
        assert!(app.data().published);
        assert_eq!(app.data().name, "Renamed by gateway");
        assert!(app.data().tags.is_empty());

        let calls = mock.calls();
        assert_eq!(calls[1].method, "PUT");
        assert_eq!(calls[1].endpoint, "/apps/app_1");
        assert_eq!(calls[1].body, Some(json!({ "published": true })));
    }

    #[tokio::test]
    async fn test_create_sends_only_writable_fields() {
        let mock = RecordingHttp::with_responses(vec![Ok(snapshot(false))]);
        let http: SharedHttp = mock.clone();

        let params = CreateAppParams {
            tags: vec!["health".to_string()],
            ..CreateAppParams::new("Cohort analysis")
        };
        create(&http, &params).await.unwrap();

        let body = mock.calls()[0].body.clone().unwrap();
        assert_eq!(
            body,
            json!({ "name": "Cohort analysis", "published": false, "tags": ["health"] })
        );
    }

    #[tokio::test]
    async fn test_associated_collections_use_nested_paths() {
        let empty = json!({ "results": [] });
        let mock = RecordingHttp::with_responses(vec![
            Ok(snapshot(true)),
            Ok(empty.clone()),
            Ok(empty.clone()),
            Ok(empty),
        ]);
        let http: SharedHttp = mock.clone();

        let app = get(&http, &AppId::new("app_1")).await.unwrap();
        assert!(app.clients(ClientFilter::default()).await.unwrap().is_empty());
        assert!(app.jobs(JobFilter::default()).await.unwrap().is_empty());
        assert!(app.grants(GrantFilter::default()).await.unwrap().is_empty());

        let calls = mock.calls();
        assert_eq!(calls[1].endpoint, "/apps/app_1/clients");
        assert_eq!(calls[2].endpoint, "/apps/app_1/jobs");
        assert_eq!(calls[3].endpoint, "/grants");
        assert_eq!(calls[3].query, vec![("app".to_string(), "app_1".to_string())]);
    }
}
