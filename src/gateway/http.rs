//! HTTP transport for the gateway REST API

use super::auth::ApiToken;
use super::transport::{ByteStream, HttpClient, Part, PartBody};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{multipart, Body, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull the gateway's message out of an error body.
/// Accepts `{"error": {"message": ..}}`, `{"message": ..}` and `{"error": ".."}`,
/// falling back to the sanitized raw text.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json
            .get("error")
            .and_then(|e| e.get("message"))
            .or_else(|| json.get("message"))
            .or_else(|| json.get("error"))
            .and_then(|v| v.as_str());
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let sanitized = sanitize_for_log(body.trim());
    if sanitized.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        sanitized
    }
}

fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| Error::contract(format!("response body is not valid JSON: {}", e)))
}

/// reqwest-backed implementation of [`HttpClient`]
#[derive(Clone)]
pub struct RestTransport {
    client: Client,
    base_url: Url,
    token: Option<ApiToken>,
}

impl RestTransport {
    /// Create a transport for the gateway at `base_url`
    pub fn new(base_url: &str, token: Option<ApiToken>) -> Result<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, token: Option<ApiToken>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .user_agent(concat!("cdx/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a gateway-relative endpoint against the base URL
    fn url(&self, endpoint: &str, query: &[(String, String)]) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}{}", url.path().trim_end_matches('/'), endpoint);
        url.set_path(&path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, "{} {}", method, url);

        let builder = self
            .client
            .request(method, url)
            .header("x-request-id", request_id);

        match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Read the body and turn anything but `expected` into a request error
    async fn expect_json(response: Response, expected: StatusCode) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if status != expected {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::request(status.as_u16(), error_message(status, &body)));
        }

        parse_json(&body)
    }
}

#[async_trait]
impl HttpClient for RestTransport {
    async fn create(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = self.url(endpoint, &[]);
        let response = self.request(Method::POST, url).json(body).send().await?;
        Self::expect_json(response, StatusCode::CREATED).await
    }

    async fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value> {
        let url = self.url(endpoint, query);
        let response = self.request(Method::GET, url).send().await?;
        Self::expect_json(response, StatusCode::OK).await
    }

    async fn update(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = self.url(endpoint, &[]);
        let response = self.request(Method::PUT, url).json(body).send().await?;
        Self::expect_json(response, StatusCode::OK).await
    }

    async fn delete(&self, endpoint: &str) -> Result<()> {
        let url = self.url(endpoint, &[]);
        let response = self.request(Method::DELETE, url).send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await?;
        if status.is_success() {
            tracing::error!("DELETE {} answered {} instead of 204", endpoint, status);
            return Err(Error::contract(format!(
                "expected 204 No Content on delete, got {} with a {} byte body",
                status,
                body.len()
            )));
        }

        tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        Err(Error::request(status.as_u16(), error_message(status, &body)))
    }

    async fn stream_upload(&self, endpoint: &str, parts: Vec<Part>) -> Result<Value> {
        let url = self.url(endpoint, &[]);

        let mut form = multipart::Form::new();
        for part in parts {
            tracing::debug!("multipart part: {:?}", part);
            let mut encoded = match part.body {
                PartBody::Bytes(bytes) => {
                    let len = bytes.len() as u64;
                    multipart::Part::stream_with_length(Body::from(bytes), len)
                }
                PartBody::Stream {
                    stream,
                    length: Some(len),
                } => multipart::Part::stream_with_length(Body::wrap_stream(stream), len),
                PartBody::Stream {
                    stream,
                    length: None,
                } => multipart::Part::stream(Body::wrap_stream(stream)),
            }
            .mime_str(&part.content_type)?;
            if let Some(file_name) = part.file_name {
                encoded = encoded.file_name(file_name);
            }
            form = form.part(part.name, encoded);
        }

        let response = self.request(Method::POST, url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("Upload failed: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::request(status.as_u16(), error_message(status, &body)));
        }

        parse_json(&body)
    }

    async fn stream_download(&self, endpoint: &str) -> Result<ByteStream> {
        let url = self.url(endpoint, &[]);
        let response = self.request(Method::GET, url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Download failed: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::request(status.as_u16(), error_message(status, &body)));
        }

        Ok(response.bytes_stream().map_err(Error::from).boxed())
    }
}
