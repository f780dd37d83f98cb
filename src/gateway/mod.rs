//! Gateway interaction module
//!
//! Authentication, transport and the top-level client.
//!
//! # Module Structure
//!
//! - [`auth`] - Bearer token handling
//! - [`transport`] - The [`transport::HttpClient`] capability the resource layer consumes
//! - [`http`] - reqwest implementation of that capability
//! - [`client`] - [`client::CdxClient`] and its per-kind collection handles
//!
//! # Example
//!
//! ```no_run
//! use cdx::gateway::{auth::ApiToken, client::CdxClient};
//! use cdx::models::CreateAppParams;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let cdx = CdxClient::new("http://127.0.0.1:8080", ApiToken::from_env())?;
//!     let mut app = cdx.apps().create(&CreateAppParams::new("demo")).await?;
//!     app.publish().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod transport;
