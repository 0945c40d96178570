use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Status of a print job as reported back to the queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

/// Queue-assigned job identifier. The queue may hand out numeric or string ids;
/// the same form is echoed back when reporting status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(n) => write!(f, "{}", n),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId::Text(value.to_string())
    }
}

/// A pending print job fetched from the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: JobId,
    #[serde(default)]
    pub label_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl PrintJob {
    /// Label count declared by the queue, falling back to the labels carried.
    pub fn declared_label_count(&self) -> u64 {
        self.label_count
            .map(u64::from)
            .unwrap_or(self.labels.len() as u64)
    }
}

/// One printable shipping label within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: JobId,
    #[serde(default)]
    pub order_name: String,
    /// Base64-encoded PDF document.
    #[serde(default, alias = "pdfBase64")]
    pub pdf: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

impl Label {
    /// The document payload, or `None` when missing or blank.
    pub fn payload(&self) -> Option<&str> {
        self.pdf.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Name the print job is submitted under.
    pub fn job_name(&self) -> String {
        format!("Label {}", self.order_name)
    }
}

/// Approximate decoded size in bytes of a base64 payload of `encoded_len` characters.
pub fn estimate_decoded_size(encoded_len: usize) -> usize {
    encoded_len * 3 / 4
}

/// Body of `GET /api/print-jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub jobs: Option<Vec<PrintJob>>,
}

/// Body of `PUT /api/print-jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal result of processing one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub status: JobStatus,
    pub error: Option<String>,
    pub printed: usize,
    pub skipped: usize,
}
