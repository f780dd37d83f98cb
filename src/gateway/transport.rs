//! Transport capability
//!
//! The resource layer talks to the gateway only through [`HttpClient`].
//! [`super::http::RestTransport`] is the reqwest implementation; tests and
//! embedders can plug in their own.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::Value;
use std::sync::Arc;

/// Response body delivered chunk by chunk
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Transport shared by every collection handle and model object of a client
pub type SharedHttp = Arc<dyn HttpClient>;

/// Authenticated HTTP capability consumed by the resource layer.
///
/// Endpoints are gateway-relative paths such as `/apps/abc`. Implementations
/// own authentication and JSON encoding, and must map statuses as documented
/// on each method.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST a JSON body, expecting 201
    async fn create(&self, endpoint: &str, body: &Value) -> Result<Value>;

    /// GET with query parameters, expecting 200
    async fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value>;

    /// PUT a JSON body, expecting 200
    async fn update(&self, endpoint: &str, body: &Value) -> Result<Value>;

    /// DELETE, expecting exactly 204. Any other 2xx is a contract violation.
    async fn delete(&self, endpoint: &str) -> Result<()>;

    /// POST a multipart body, expecting any 2xx with a JSON body
    async fn stream_upload(&self, endpoint: &str, parts: Vec<Part>) -> Result<Value>;

    /// GET a binary body. A non-2xx status fails here, before any chunk is
    /// handed out.
    async fn stream_download(&self, endpoint: &str) -> Result<ByteStream>;
}

/// One part of a multipart request
pub struct Part {
    pub name: String,
    pub content_type: String,
    pub file_name: Option<String>,
    pub body: PartBody,
}

pub enum PartBody {
    Bytes(Bytes),
    Stream {
        stream: ByteStream,
        length: Option<u64>,
    },
}

impl Part {
    /// JSON-encoded part
    pub fn json(name: &str, value: &Value) -> Result<Self> {
        let encoded = serde_json::to_vec(value).map_err(crate::Error::Encode)?;
        Ok(Self {
            name: name.to_string(),
            content_type: "application/json".to_string(),
            file_name: None,
            body: PartBody::Bytes(Bytes::from(encoded)),
        })
    }

    /// Opaque binary part
    pub fn binary(name: &str, body: PartBody) -> Self {
        Self {
            name: name.to_string(),
            content_type: "application/octet-stream".to_string(),
            file_name: Some(name.to_string()),
            body,
        }
    }
}

impl std::fmt::Debug for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.body {
            PartBody::Bytes(b) => format!("{} bytes", b.len()),
            PartBody::Stream { length, .. } => match length {
                Some(len) => format!("stream of {} bytes", len),
                None => "stream".to_string(),
            },
        };
        f.debug_struct("Part")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("body", &body)
            .finish()
    }
}
