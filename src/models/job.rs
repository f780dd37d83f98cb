//! Compute jobs
//!
//! Jobs run an app's workload over granted datasets inside the gateway's
//! confidential environment. They are created under an app and are
//! immutable afterwards; callers poll [`Job::refresh`] until
//! [`Job::is_finished`].

use super::app::{self, App};
use crate::error::Result;
use crate::gateway::transport::SharedHttp;
use crate::resource::collection::{self, Resource};
use crate::resource::endpoint;
use crate::resource::filter::{Filter, Matcher};
use crate::resource::id::{AppId, DatasetId, JobId};
use crate::resource::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const PLURAL: &str = "jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// A status this client does not know yet
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    pub id: JobId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub app: AppId,
    #[serde(default)]
    pub datasets: Vec<DatasetId>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobParams {
    pub datasets: Vec<DatasetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub page: PageRequest,
}

impl From<JobFilter> for Filter {
    fn from(f: JobFilter) -> Self {
        let mut filter = Filter::new();
        filter.set_opt("status", f.status.map(Matcher::equals));
        f.page.apply(&mut filter);
        filter
    }
}

#[derive(Clone)]
pub struct Job {
    http: SharedHttp,
    data: JobData,
}

impl Resource for Job {
    type Data = JobData;
    const KIND: &'static str = "job";

    fn from_data(http: SharedHttp, data: JobData) -> Self {
        Self { http, data }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Job").field(&self.data).finish()
    }
}

impl Job {
    pub fn id(&self) -> &JobId {
        &self.data.id
    }

    pub fn data(&self) -> &JobData {
        &self.data
    }

    pub fn into_data(self) -> JobData {
        self.data
    }

    pub fn status(&self) -> JobStatus {
        self.data.status
    }

    pub fn is_finished(&self) -> bool {
        self.data.status.is_terminal()
    }

    /// Re-fetch the job and replace this object's snapshot
    pub async fn refresh(&mut self) -> Result<()> {
        let latest = get(&self.http, &self.data.id, &self.data.app).await?;
        self.data = latest.data;
        Ok(())
    }

    /// Cancel the job by deleting it
    pub async fn cancel(&self) -> Result<()> {
        delete(&self.http, &self.data.id, &self.data.app).await
    }

    pub async fn app(&self) -> Result<App> {
        app::get(&self.http, &self.data.app).await
    }
}

fn collection_path(app_id: &AppId) -> Result<String> {
    endpoint::nested_collection(app::PLURAL, app_id.as_str(), PLURAL)
}

fn item_path(id: &JobId, app_id: &AppId) -> Result<String> {
    endpoint::nested_item(app::PLURAL, app_id.as_str(), PLURAL, id.as_str())
}

pub async fn create(http: &SharedHttp, app_id: &AppId, params: &CreateJobParams) -> Result<Job> {
    collection::create(http, &collection_path(app_id)?, params).await
}

pub async fn get(http: &SharedHttp, id: &JobId, app_id: &AppId) -> Result<Job> {
    collection::get(http, &item_path(id, app_id)?).await
}

pub async fn list(http: &SharedHttp, app_id: &AppId, filter: impl Into<Filter>) -> Result<Page<Job>> {
    collection::list(http, &collection_path(app_id)?, &filter.into()).await
}

pub async fn delete(http: &SharedHttp, id: &JobId, app_id: &AppId) -> Result<()> {
    collection::delete(http, Job::KIND, &item_path(id, app_id)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::collection::testing::RecordingHttp;
    use serde_json::json;

    fn snapshot(status: &str) -> Value {
        json!({
            "id": "job_1",
            "createdAt": "2024-06-01T09:00:00Z",
            "app": "app_1",
            "datasets": ["ds_1", "ds_2"],
            "status": status,
            "parameters": { "threshold": 0.5 }
        })
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let data: JobData = serde_json::from_value(snapshot("quarantined")).unwrap();
        assert_eq!(data.status, JobStatus::Unknown);
        assert!(!data.status.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }

    #[tokio::test]
    async fn test_refresh_follows_status() {
        let mut finished = snapshot("succeeded");
        finished["result"] = json!({ "rows": 42 });
        finished["finishedAt"] = json!("2024-06-01T09:05:00Z");

        let mock = RecordingHttp::with_responses(vec![Ok(snapshot("running")), Ok(finished)]);
        let http: SharedHttp = mock.clone();

        let mut job = get(&http, &JobId::new("job_1"), &AppId::new("app_1"))
            .await
            .unwrap();
        assert_eq!(job.status(), JobStatus::Running);
        assert!(!job.is_finished());

        job.refresh().await.unwrap();
        assert!(job.is_finished());
        assert_eq!(job.data().result, Some(json!({ "rows": 42 })));
        assert_eq!(mock.calls()[1].endpoint, "/apps/app_1/jobs/job_1");
    }

    #[tokio::test]
    async fn test_dot_segment_id_sends_nothing() {
        let mock = RecordingHttp::with_responses(vec![Ok(Value::Null)]);
        let http: SharedHttp = mock.clone();

        let err = delete(&http, &JobId::new(".."), &AppId::new("app_1"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidId(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_status_filter() {
        let filter: Filter = JobFilter {
            status: Some(JobStatus::Running),
            page: PageRequest::default(),
        }
        .into();
        assert_eq!(filter.to_query(), vec![("status".to_string(), "running".to_string())]);
    }
}
