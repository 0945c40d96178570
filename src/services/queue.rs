use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::config::AgentConfig;
use crate::models::job::{JobId, JobStatus, JobsResponse, PrintJob, StatusUpdate};

const JOBS_PATH: &str = "/api/print-jobs";
const API_KEY_HEADER: &str = "X-API-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the remote print queue.
#[derive(Debug, Clone)]
pub struct QueueTarget {
    pub api_url: String,
    pub api_key: String,
}

impl QueueTarget {
    fn jobs_url(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), JOBS_PATH)
    }
}

impl From<&AgentConfig> for QueueTarget {
    fn from(config: &AgentConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

/// Remote job queue access.
#[async_trait::async_trait]
pub trait JobQueue: Send + Sync {
    /// Pending jobs in queue order. Empty is not an error.
    async fn fetch_jobs(&self, target: &QueueTarget) -> Result<Vec<PrintJob>, QueueError>;

    /// Single attempt at a status write.
    async fn try_report_status(
        &self,
        target: &QueueTarget,
        update: &StatusUpdate,
    ) -> Result<(), ReportError>;

    /// Best-effort status write. Failures are logged and dropped; a lost
    /// status update never fails the job or the poll cycle.
    async fn report_status(
        &self,
        target: &QueueTarget,
        job_id: &JobId,
        status: JobStatus,
        error: Option<String>,
    ) {
        let update = StatusUpdate {
            job_id: job_id.clone(),
            status,
            error,
        };
        if let Err(e) = self.try_report_status(target, &update).await {
            metrics::counter!("status_report_failures_total").increment(1);
            tracing::warn!(job_id = %job_id, status = %status, error = %e, "Failed to report job status");
        }
    }
}

/// HTTP client for the queue's `/api/print-jobs` endpoint.
pub struct HttpJobQueue {
    http: Client,
}

impl HttpJobQueue {
    pub fn new() -> Result<Self, QueueError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(QueueError::Http)?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl JobQueue for HttpJobQueue {
    async fn fetch_jobs(&self, target: &QueueTarget) -> Result<Vec<PrintJob>, QueueError> {
        let response = self
            .http
            .get(target.jobs_url())
            .header(API_KEY_HEADER, &target.api_key)
            .send()
            .await
            .map_err(QueueError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueueError::Status(status));
        }

        let body: JobsResponse = response.json().await.map_err(QueueError::Http)?;
        Ok(body.jobs.unwrap_or_default())
    }

    async fn try_report_status(
        &self,
        target: &QueueTarget,
        update: &StatusUpdate,
    ) -> Result<(), ReportError> {
        let response = self
            .http
            .put(target.jobs_url())
            .header(API_KEY_HEADER, &target.api_key)
            .json(update)
            .send()
            .await
            .map_err(ReportError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Status(status));
        }
        Ok(())
    }
}

/// Fetch failure: the queue was unreachable or answered badly.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Queue responded with {0}")]
    Status(StatusCode),
}

/// Status write failure. Only surfaced by `try_report_status`.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Queue responded with {0}")]
    Status(StatusCode),
}
