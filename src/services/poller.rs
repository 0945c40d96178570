use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ConfigError;
use crate::context::AgentContext;
use crate::models::job::JobOutcome;
use crate::models::status::ConnectivityStatus;
use crate::services::printer::PrinterGateway;
use crate::services::processor::JobProcessor;
use crate::services::queue::{JobQueue, QueueTarget};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Timer-driven poll loop.
///
/// Every tick spawns an independent poll cycle, so a slow batch never delays
/// the next fetch. Cycles may therefore overlap; the queue tolerates this
/// because every job carries its own id. `stop` only cancels future ticks and
/// lets in-flight jobs finish; `shutdown` also waits for them.
pub struct PollLoop {
    context: Arc<AgentContext>,
    queue: Arc<dyn JobQueue>,
    processor: Arc<JobProcessor>,
    interval: Duration,
    running: Mutex<Option<CancellationToken>>,
    tasks: TaskTracker,
}

impl PollLoop {
    pub fn new(
        context: Arc<AgentContext>,
        queue: Arc<dyn JobQueue>,
        printer: Arc<dyn PrinterGateway>,
        interval: Duration,
    ) -> Self {
        let processor = JobProcessor::new(
            queue.clone(),
            printer,
            context.stats().clone(),
            context.activity().clone(),
        );
        Self {
            context,
            queue,
            processor: Arc::new(processor),
            interval,
            running: Mutex::new(None),
            tasks: TaskTracker::new(),
        }
    }

    pub fn context(&self) -> &Arc<AgentContext> {
        &self.context
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Validate settings and begin polling. A no-op while already running.
    pub async fn start(self: &Arc<Self>) -> Result<(), ConfigError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            tracing::debug!("Poll loop already running");
            return Ok(());
        }

        let config = self.context.config().await;
        if let Err(e) = config.ensure_ready() {
            tracing::warn!(error = %e, "Refusing to start poll loop");
            self.context.activity().error(e.to_string()).await;
            return Err(e);
        }

        let token = CancellationToken::new();
        self.context.set_status(ConnectivityStatus::Connecting);
        self.tasks.spawn(self.clone().run_ticker(token.clone()));
        *running = Some(token);

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            test_mode = config.test_mode,
            "Poll loop started"
        );
        let mode = if config.test_mode { " in test mode" } else { "" };
        self.context
            .activity()
            .info(format!("Polling started{}", mode))
            .await;
        Ok(())
    }

    /// Cancel future ticks and go offline.
    pub async fn stop(&self) {
        if let Some(token) = self.running.lock().await.take() {
            token.cancel();
            tracing::info!("Poll loop stopped");
            self.context.activity().info("Polling stopped").await;
        }
        self.context.set_status(ConnectivityStatus::Offline);
    }

    /// Stop polling and wait until every in-flight job has reported its
    /// terminal status.
    pub async fn shutdown(&self) {
        self.stop().await;
        self.tasks.close();
        tracing::info!(pending = self.tasks.len(), "Waiting for in-flight print jobs");
        self.tasks.wait().await;
    }

    async fn run_ticker(self: Arc<Self>, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let this = self.clone();
                    let token = token.clone();
                    self.tasks.spawn(async move {
                        this.poll_cycle(&token).await;
                    });
                }
            }
        }
        tracing::debug!("Poll ticker exited");
    }

    /// One fetch-and-process pass. Jobs run one after another in fetch order.
    pub async fn poll_cycle(&self, token: &CancellationToken) -> Vec<JobOutcome> {
        let config = self.context.config().await;
        let target = QueueTarget::from(&config);

        let jobs = match self.queue.fetch_jobs(&target).await {
            Ok(jobs) => jobs,
            Err(e) => {
                metrics::counter!("poll_failures_total").increment(1);
                tracing::warn!(error = %e, "Failed to fetch print jobs");
                if !token.is_cancelled() {
                    let previous = self.context.set_status(ConnectivityStatus::Offline);
                    if previous != ConnectivityStatus::Offline {
                        self.context
                            .activity()
                            .error(format!("Queue unreachable: {}", e))
                            .await;
                    }
                }
                return Vec::new();
            }
        };

        if !token.is_cancelled() {
            let previous = self.context.set_status(ConnectivityStatus::Online);
            if previous != ConnectivityStatus::Online {
                self.context.activity().info("Connected to print queue").await;
            }
        }

        if jobs.is_empty() {
            tracing::trace!("No pending print jobs");
            return Vec::new();
        }

        tracing::info!(count = jobs.len(), "Fetched print jobs");
        self.context
            .activity()
            .info(format!("Found {} print job(s)", jobs.len()))
            .await;

        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in &jobs {
            outcomes.push(self.processor.process(job, &config).await);
        }
        outcomes
    }
}
