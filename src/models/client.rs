//! App clients
//!
//! Credentials an app uses to call the gateway. Clients are nested under
//! their app: `/apps/{appId}/clients/{id}`. The secret is only present in
//! the response to `create`.

use super::app::{self, App};
use crate::error::Result;
use crate::gateway::transport::SharedHttp;
use crate::resource::collection::{self, Resource};
use crate::resource::endpoint;
use crate::resource::filter::Filter;
use crate::resource::id::{AppId, ClientId};
use crate::resource::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PLURAL: &str = "clients";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    pub id: ClientId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub app: AppId,
    pub name: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

// Security: keep the client secret out of logs
impl std::fmt::Debug for ClientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientData")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("app", &self.app)
            .field("name", &self.name)
            .field("redirect_uris", &self.redirect_uris)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientParams {
    pub name: String,
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uris: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub page: PageRequest,
}

impl From<ClientFilter> for Filter {
    fn from(f: ClientFilter) -> Self {
        let mut filter = Filter::new();
        f.page.apply(&mut filter);
        filter
    }
}

#[derive(Clone)]
pub struct Client {
    http: SharedHttp,
    data: ClientData,
}

impl Resource for Client {
    type Data = ClientData;
    const KIND: &'static str = "client";

    fn from_data(http: SharedHttp, data: ClientData) -> Self {
        Self { http, data }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Client").field(&self.data).finish()
    }
}

impl Client {
    pub fn id(&self) -> &ClientId {
        &self.data.id
    }

    pub fn data(&self) -> &ClientData {
        &self.data
    }

    pub fn into_data(self) -> ClientData {
        self.data
    }

    pub async fn update(&mut self, params: &UpdateClientParams) -> Result<()> {
        let updated = update(&self.http, &self.data.id, &self.data.app, params).await?;
        self.data = updated.data;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        delete(&self.http, &self.data.id, &self.data.app).await
    }

    pub async fn app(&self) -> Result<App> {
        app::get(&self.http, &self.data.app).await
    }
}

fn collection_path(app_id: &AppId) -> Result<String> {
    endpoint::nested_collection(app::PLURAL, app_id.as_str(), PLURAL)
}

fn item_path(id: &ClientId, app_id: &AppId) -> Result<String> {
    endpoint::nested_item(app::PLURAL, app_id.as_str(), PLURAL, id.as_str())
}

pub async fn create(http: &SharedHttp, app_id: &AppId, params: &CreateClientParams) -> Result<Client> {
    collection::create(http, &collection_path(app_id)?, params).await
}

pub async fn get(http: &SharedHttp, id: &ClientId, app_id: &AppId) -> Result<Client> {
    collection::get(http, &item_path(id, app_id)?).await
}

pub async fn list(http: &SharedHttp, app_id: &AppId, filter: impl Into<Filter>) -> Result<Page<Client>> {
    collection::list(http, &collection_path(app_id)?, &filter.into()).await
}

pub async fn update(
    http: &SharedHttp,
    id: &ClientId,
    app_id: &AppId,
    params: &UpdateClientParams,
) -> Result<Client> {
    collection::update(http, &item_path(id, app_id)?, params).await
}

pub async fn delete(http: &SharedHttp, id: &ClientId, app_id: &AppId) -> Result<()> {
    collection::delete(http, Client::KIND, &item_path(id, app_id)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::collection::testing::RecordingHttp;
    use serde_json::json;

    fn snapshot() -> serde_json::Value {
        json!({
            "id": "cli_1",
            "createdAt": "2024-05-05T05:05:05Z",
            "app": "app_1",
            "name": "backend",
            "redirectUris": ["https://app.example/callback"],
            "secret": "s3cr3t"
        })
    }

    #[test]
    fn test_debug_hides_secret() {
        let data: ClientData = serde_json::from_value(snapshot()).unwrap();
        assert_eq!(data.secret.as_deref(), Some("s3cr3t"));
        assert_eq!(data.redirect_uris, vec!["https://app.example/callback"]);
        assert!(!format!("{:?}", data).contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_nested_item_operations() {
        let mock = RecordingHttp::with_responses(vec![Ok(snapshot()), Ok(serde_json::Value::Null)]);
        let http: SharedHttp = mock.clone();

        let client = get(&http, &ClientId::new("cli_1"), &AppId::new("app_1"))
            .await
            .unwrap();
        client.delete().await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls[0].endpoint, "/apps/app_1/clients/cli_1");
        assert_eq!(calls[1].method, "DELETE");
        assert_eq!(calls[1].endpoint, "/apps/app_1/clients/cli_1");
    }
}
