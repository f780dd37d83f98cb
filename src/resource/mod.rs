//! Resource abstraction layer
//!
//! Kind-independent machinery shared by every model in [`crate::models`].
//!
//! # Architecture
//!
//! - [`id`] - Typed identifiers, one per resource kind
//! - [`endpoint`] - Gateway path construction with escaped id segments
//! - [`filter`] - Filter values and their query-string encoding
//! - [`pagination`] - The `{results, nextPageToken}` envelope and cursor
//! - [`collection`] - Generic create/get/list/update/delete over a transport
//! - [`stream`] - Upload futures and download handles
//!
//! # Example
//!
//! ```no_run
//! use cdx::resource::filter::{Filter, Matcher};
//! use cdx::{CdxClient, models::App, resource::pagination::Page};
//!
//! async fn published(cdx: &CdxClient) -> cdx::Result<Page<App>> {
//!     let filter = Filter::new()
//!         .equals("published", true)
//!         .with("tags", Matcher::all_of(["health", "eu"])?)
//!         .page_size(50);
//!     cdx.apps().list(filter).await
//! }
//! ```

pub mod collection;
pub mod endpoint;
pub mod filter;
pub mod id;
pub mod pagination;
pub mod stream;

pub use collection::Resource;
pub use filter::{Filter, Matcher};
pub use id::{AppId, ClientId, ConsentId, DatasetId, GrantId, IdentityId, JobId};
pub use pagination::{collect_all, Cursor, Page, PageRequest};
pub use stream::{Download, Upload, UploadData};
