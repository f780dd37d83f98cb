//! Resource model objects
//!
//! One module per gateway resource kind. Each holds the wire schema
//! (`*Data`), the writable parameter sets, a typed filter, the model object
//! and free `create/get/list/update/delete` functions over a transport.
//! Nested kinds take their parent id: clients and jobs live under an app,
//! consents under an identity.

pub mod app;
pub mod client;
pub mod consent;
pub mod dataset;
pub mod grant;
pub mod identity;
pub mod job;

pub use app::{App, AppData, AppFilter, CreateAppParams, UpdateAppParams};
pub use client::{Client, ClientData, ClientFilter, CreateClientParams, UpdateClientParams};
pub use consent::{Consent, ConsentData, ConsentFilter, CreateConsentParams, UpdateConsentParams};
pub use dataset::{Dataset, DatasetData, DatasetFilter, UpdateDatasetParams, UploadDatasetParams};
pub use grant::{CreateGrantParams, Grant, GrantData, GrantFilter, UpdateGrantParams};
pub use identity::{
    CreateIdentityParams, Identity, IdentityData, IdentityFilter, UpdateIdentityParams,
};
pub use job::{CreateJobParams, Job, JobData, JobFilter, JobStatus};
