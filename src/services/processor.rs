use std::sync::Arc;

use base64::Engine;
use tracing::instrument;

use crate::config::AgentConfig;
use crate::models::job::{estimate_decoded_size, JobOutcome, JobStatus, Label, PrintJob};
use crate::services::activity::ActivityLog;
use crate::services::printer::{PrintError, PrinterGateway};
use crate::services::queue::{JobQueue, QueueTarget};
use crate::services::stats::StatsAggregator;

/// Drives one job through `processing → completed | failed`.
///
/// Labels are handled strictly in order. A label without a payload is skipped
/// and the job carries on; a payload that cannot be decoded or printed abandons
/// the rest of the job. Exactly one terminal status is reported per job.
pub struct JobProcessor {
    queue: Arc<dyn JobQueue>,
    printer: Arc<dyn PrinterGateway>,
    stats: Arc<StatsAggregator>,
    activity: Arc<ActivityLog>,
}

impl JobProcessor {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        printer: Arc<dyn PrinterGateway>,
        stats: Arc<StatsAggregator>,
        activity: Arc<ActivityLog>,
    ) -> Self {
        Self {
            queue,
            printer,
            stats,
            activity,
        }
    }

    #[instrument(skip_all, fields(job_id = %job.id, test_mode = config.test_mode))]
    pub async fn process(&self, job: &PrintJob, config: &AgentConfig) -> JobOutcome {
        let target = QueueTarget::from(config);
        let total = job.labels.len();

        tracing::info!(labels = total, "Processing print job");
        self.activity
            .info(format!("Processing job {} ({} labels)", job.id, total))
            .await;
        self.queue
            .report_status(&target, &job.id, JobStatus::Processing, None)
            .await;

        let mut printed = 0;
        let mut skipped = 0;
        let mut failure: Option<String> = None;

        for (index, label) in job.labels.iter().enumerate() {
            let position = format!("{}/{}", index + 1, total);
            match self.print_label(label, config).await {
                Ok(bytes) => {
                    printed += 1;
                    let kb = bytes / 1024;
                    if config.test_mode {
                        tracing::info!(label = %position, order = %label.order_name, bytes, "Simulated label print");
                        self.activity
                            .success(format!(
                                "TEST: label {} {} ({} KB) not sent to printer",
                                position, label.order_name, kb
                            ))
                            .await;
                    } else {
                        tracing::info!(label = %position, order = %label.order_name, bytes, printer = %config.printer, "Label printed");
                        self.activity
                            .success(format!(
                                "Printed label {} {} ({} KB) on {}",
                                position, label.order_name, kb, config.printer
                            ))
                            .await;
                    }
                }
                Err(LabelError::Payload(e)) => {
                    skipped += 1;
                    tracing::warn!(label = %position, order = %label.order_name, error = %e, "Skipping label");
                    self.activity
                        .error(format!("Label {} {}: {}", position, label.order_name, e))
                        .await;
                }
                Err(LabelError::Print(e)) => {
                    tracing::error!(label = %position, order = %label.order_name, error = %e, "Label print failed, abandoning job");
                    self.activity
                        .error(format!("Label {} {} failed: {}", position, label.order_name, e))
                        .await;
                    failure = Some(e.to_string());
                    break;
                }
            }
        }

        let status = match &failure {
            None => JobStatus::Completed,
            Some(_) => JobStatus::Failed,
        };
        self.queue
            .report_status(&target, &job.id, status, failure.clone())
            .await;

        match &failure {
            None => {
                let stats = self.stats.record_labels(job.declared_label_count()).await;
                metrics::counter!("print_jobs_completed_total").increment(1);
                tracing::info!(
                    printed,
                    skipped,
                    labels_today = stats.labels_today,
                    "Print job completed"
                );
                self.activity
                    .info(format!("Job {} completed ({} printed, {} skipped)", job.id, printed, skipped))
                    .await;
            }
            Some(error) => {
                metrics::counter!("print_jobs_failed_total").increment(1);
                tracing::warn!(printed, skipped, error = %error, "Print job failed");
                self.activity
                    .error(format!("Job {} failed: {}", job.id, error))
                    .await;
            }
        }

        JobOutcome {
            job_id: job.id.clone(),
            status,
            error: failure,
            printed,
            skipped,
        }
    }

    /// Print or simulate one label, returning the document size in bytes.
    async fn print_label(&self, label: &Label, config: &AgentConfig) -> Result<usize, LabelError> {
        let payload = label.payload().ok_or(PayloadError::Missing)?;

        if config.test_mode {
            return Ok(estimate_decoded_size(payload.len()));
        }

        let document = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(PrintError::from)?;

        self.printer
            .submit(&config.printer, &label.job_name(), &document)
            .await?;

        Ok(document.len())
    }
}

/// Label carries no document. The label is skipped, the job continues.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("missing PDF document")]
    Missing,
}

#[derive(Debug, thiserror::Error)]
enum LabelError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Print(#[from] PrintError),
}
