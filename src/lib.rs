//! Typed client for the confidential data-exchange gateway.
//!
//! Start from [`CdxClient`]: it hands out collection handles for every
//! resource kind, and the model objects it returns carry the transport so
//! they can update, delete and navigate to related resources themselves.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod resource;

pub use error::{Error, Result};
pub use gateway::auth::ApiToken;
pub use gateway::client::CdxClient;
pub use gateway::http::RestTransport;
pub use gateway::transport::{ByteStream, HttpClient, SharedHttp};
