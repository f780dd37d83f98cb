//! Generic collection operations
//!
//! Every resource kind's `create/get/list/update/delete` funnels through
//! these helpers: serialize the writable params, call the transport, and
//! build model objects from whatever the gateway answered.

use super::filter::Filter;
use super::pagination::{Page, PageData};
use crate::error::{Error, Result};
use crate::gateway::transport::SharedHttp;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A model object backed by a data snapshot
pub trait Resource: Sized {
    /// Wire schema of the resource
    type Data: DeserializeOwned;

    /// Kind name used in logs
    const KIND: &'static str;

    fn from_data(http: SharedHttp, data: Self::Data) -> Self;
}

fn encode<P: Serialize>(params: &P) -> Result<Value> {
    serde_json::to_value(params).map_err(Error::Encode)
}

pub(crate) fn decode<D: DeserializeOwned>(kind: &str, value: Value) -> Result<D> {
    serde_json::from_value(value)
        .map_err(|e| Error::contract(format!("unexpected {} payload: {}", kind, e)))
}

pub async fn create<R, P>(http: &SharedHttp, endpoint: &str, params: &P) -> Result<R>
where
    R: Resource,
    P: Serialize,
{
    let body = encode(params)?;
    let response = http.create(endpoint, &body).await?;
    let data = decode(R::KIND, response)?;
    tracing::info!("created {} at {}", R::KIND, endpoint);
    Ok(R::from_data(http.clone(), data))
}

pub async fn get<R: Resource>(http: &SharedHttp, endpoint: &str) -> Result<R> {
    let response = http.get(endpoint, &[]).await?;
    let data = decode(R::KIND, response)?;
    Ok(R::from_data(http.clone(), data))
}

pub async fn list<R: Resource>(http: &SharedHttp, endpoint: &str, filter: &Filter) -> Result<Page<R>> {
    let response = http.get(endpoint, &filter.to_query()).await?;
    let data: PageData<R::Data> = decode(R::KIND, response)?;
    tracing::debug!(
        "listed {} {}(s), more: {}",
        data.results.len(),
        R::KIND,
        data.next_page_token.is_some()
    );

    Ok(Page {
        results: data
            .results
            .into_iter()
            .map(|d| R::from_data(http.clone(), d))
            .collect(),
        next_page_token: data.next_page_token,
    })
}

/// PUT the writable fields; the result reflects only the gateway's answer
pub async fn update<R, P>(http: &SharedHttp, endpoint: &str, params: &P) -> Result<R>
where
    R: Resource,
    P: Serialize,
{
    let body = encode(params)?;
    let response = http.update(endpoint, &body).await?;
    let data = decode(R::KIND, response)?;
    tracing::info!("updated {} at {}", R::KIND, endpoint);
    Ok(R::from_data(http.clone(), data))
}

pub async fn delete(http: &SharedHttp, kind: &str, endpoint: &str) -> Result<()> {
    http.delete(endpoint).await?;
    tracing::info!("deleted {} at {}", kind, endpoint);
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport recording calls, for unit tests

    use crate::error::{Error, Result};
    use crate::gateway::transport::{ByteStream, HttpClient, Part};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub struct Call {
        pub method: &'static str,
        pub endpoint: String,
        pub query: Vec<(String, String)>,
        pub body: Option<Value>,
    }

    #[derive(Default)]
    pub struct RecordingHttp {
        pub calls: Mutex<Vec<Call>>,
        pub responses: Mutex<VecDeque<Result<Value>>>,
    }

    impl RecordingHttp {
        pub fn with_responses(responses: Vec<Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            })
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            method: &'static str,
            endpoint: &str,
            query: &[(String, String)],
            body: Option<&Value>,
        ) -> Result<Value> {
            self.calls.lock().unwrap().push(Call {
                method,
                endpoint: endpoint.to_string(),
                query: query.to_vec(),
                body: body.cloned(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::request(500, "no canned response")))
        }
    }

    #[async_trait]
    impl HttpClient for RecordingHttp {
        async fn create(&self, endpoint: &str, body: &Value) -> Result<Value> {
            self.record("POST", endpoint, &[], Some(body))
        }

        async fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value> {
            self.record("GET", endpoint, query, None)
        }

        async fn update(&self, endpoint: &str, body: &Value) -> Result<Value> {
            self.record("PUT", endpoint, &[], Some(body))
        }

        async fn delete(&self, endpoint: &str) -> Result<()> {
            self.record("DELETE", endpoint, &[], None).map(|_| ())
        }

        async fn stream_upload(&self, endpoint: &str, _parts: Vec<Part>) -> Result<Value> {
            self.record("UPLOAD", endpoint, &[], None)
        }

        async fn stream_download(&self, endpoint: &str) -> Result<ByteStream> {
            self.record("DOWNLOAD", endpoint, &[], None)?;
            Ok(Box::pin(futures::stream::empty()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingHttp;
    use super::*;
    use crate::models::App;
    use serde_json::json;

    fn app_json(id: &str, published: bool) -> Value {
        json!({
            "id": id,
            "createdAt": "2024-03-01T10:00:00Z",
            "owner": "idn_1",
            "name": "demo",
            "published": published,
            "tags": []
        })
    }

    #[tokio::test]
    async fn test_list_sends_hyphenated_query_and_keeps_order() {
        let mock = RecordingHttp::with_responses(vec![Ok(json!({
            "results": [app_json("a2", false), app_json("a1", true)],
            "nextPageToken": "next-1"
        }))]);
        let http: SharedHttp = mock.clone();

        let filter = Filter::new().page_size(2).equals("published", true);
        let page: Page<App> = list(&http, "/apps", &filter).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.results[0].id().as_str(), "a2");
        assert_eq!(page.results[1].id().as_str(), "a1");
        assert_eq!(page.next_page_token.as_deref(), Some("next-1"));

        let calls = mock.calls();
        assert_eq!(calls[0].endpoint, "/apps");
        assert_eq!(
            calls[0].query,
            vec![
                ("page-size".to_string(), "2".to_string()),
                ("published".to_string(), "true".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_contract_violation() {
        let mock = RecordingHttp::with_responses(vec![Ok(json!({ "unexpected": true }))]);
        let http: SharedHttp = mock;

        let result: Result<App> = get(&http, "/apps/a1").await;
        assert!(matches!(result, Err(Error::ContractViolation(_))));
    }

    #[tokio::test]
    async fn test_list_without_results_is_contract_violation() {
        let mock = RecordingHttp::with_responses(vec![Ok(json!({ "nextPageToken": "x" }))]);
        let http: SharedHttp = mock;

        let result: Result<Page<App>> = list(&http, "/apps", &Filter::new()).await;
        assert!(matches!(result, Err(Error::ContractViolation(_))));
    }

    #[tokio::test]
    async fn test_request_errors_pass_through() {
        let mock = RecordingHttp::with_responses(vec![Err(Error::request(404, "app not found"))]);
        let http: SharedHttp = mock;

        let err = get::<App>(&http, "/apps/missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
