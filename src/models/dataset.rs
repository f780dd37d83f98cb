//! Datasets
//!
//! Datasets are created by a multipart upload (a `metadata` JSON part and a
//! `data` binary part) and read back as a raw byte stream from
//! `/datasets/{id}/data`.

use super::grant::{self, Grant, GrantFilter};
use super::identity::{self, Identity};
use crate::error::{Error, Result};
use crate::gateway::transport::{Part, SharedHttp};
use crate::resource::collection::{self, Resource};
use crate::resource::endpoint;
use crate::resource::filter::{Filter, Matcher};
use crate::resource::id::{DatasetId, IdentityId};
use crate::resource::pagination::{Page, PageRequest};
use crate::resource::stream::{Download, Upload, UploadData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const PLURAL: &str = "datasets";
const DATA_SEGMENT: &str = "data";

const METADATA_PART: &str = "metadata";
const DATA_PART: &str = "data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetData {
    pub id: DatasetId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub owner: IdentityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Size in bytes, computed by the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Sent as the `metadata` part of an upload
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDatasetParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatasetParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct DatasetFilter {
    pub owner: Option<IdentityId>,
    pub tags: Option<Matcher>,
    pub page: PageRequest,
}

impl From<DatasetFilter> for Filter {
    fn from(f: DatasetFilter) -> Self {
        let mut filter = Filter::new();
        filter.set_opt("owner", f.owner.map(Matcher::equals));
        filter.set_opt("tags", f.tags);
        f.page.apply(&mut filter);
        filter
    }
}

#[derive(Clone)]
pub struct Dataset {
    http: SharedHttp,
    data: DatasetData,
}

impl Resource for Dataset {
    type Data = DatasetData;
    const KIND: &'static str = "dataset";

    fn from_data(http: SharedHttp, data: DatasetData) -> Self {
        Self { http, data }
    }
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Dataset").field(&self.data).finish()
    }
}

impl Dataset {
    pub fn id(&self) -> &DatasetId {
        &self.data.id
    }

    pub fn data(&self) -> &DatasetData {
        &self.data
    }

    pub fn into_data(self) -> DatasetData {
        self.data
    }

    pub async fn update(&mut self, params: &UpdateDatasetParams) -> Result<()> {
        let updated = update(&self.http, &self.data.id, params).await?;
        self.data = updated.data;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        delete(&self.http, &self.data.id).await
    }

    pub fn download(&self) -> Result<Download> {
        download(&self.http, &self.data.id)
    }

    pub async fn owner(&self) -> Result<Identity> {
        identity::get(&self.http, &self.data.owner).await
    }

    /// Grants issued on this dataset
    pub async fn grants(&self, mut filter: GrantFilter) -> Result<Page<Grant>> {
        filter.dataset = Some(self.data.id.clone());
        grant::list(&self.http, filter).await
    }
}

/// Upload a new dataset. Nothing is sent until the returned handle is awaited.
pub fn upload(
    http: &SharedHttp,
    data: impl Into<UploadData>,
    params: Option<UploadDatasetParams>,
) -> Upload<Dataset> {
    let http = http.clone();
    let data = data.into();

    Upload::new(async move {
        let mut parts = Vec::with_capacity(2);
        if let Some(params) = params {
            let metadata = serde_json::to_value(&params).map_err(Error::Encode)?;
            parts.push(Part::json(METADATA_PART, &metadata)?);
        }
        parts.push(Part::binary(DATA_PART, data.into_part_body()));

        let response = http
            .stream_upload(&endpoint::collection(PLURAL), parts)
            .await?;
        let data: DatasetData = collection::decode(Dataset::KIND, response)?;
        tracing::info!("uploaded dataset {}", data.id);
        Ok(Dataset::from_data(http, data))
    })
}

pub fn download(http: &SharedHttp, id: &DatasetId) -> Result<Download> {
    let path = endpoint::path(&[PLURAL, id.as_str(), DATA_SEGMENT])?;
    Ok(Download::new(http.clone(), path))
}

pub async fn get(http: &SharedHttp, id: &DatasetId) -> Result<Dataset> {
    collection::get(http, &endpoint::item(PLURAL, id.as_str())?).await
}

pub async fn list(http: &SharedHttp, filter: impl Into<Filter>) -> Result<Page<Dataset>> {
    collection::list(http, &endpoint::collection(PLURAL), &filter.into()).await
}

pub async fn update(
    http: &SharedHttp,
    id: &DatasetId,
    params: &UpdateDatasetParams,
) -> Result<Dataset> {
    collection::update(http, &endpoint::item(PLURAL, id.as_str())?, params).await
}

pub async fn delete(http: &SharedHttp, id: &DatasetId) -> Result<()> {
    collection::delete(http, Dataset::KIND, &endpoint::item(PLURAL, id.as_str())?).await
}
