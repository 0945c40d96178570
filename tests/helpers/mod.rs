//! Test doubles: an in-process HTTP queue and in-memory collaborators

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use label_print_agent::config::AgentConfig;
use label_print_agent::context::AgentContext;
use label_print_agent::models::job::{PrintJob, StatusUpdate};
use label_print_agent::services::poller::PollLoop;
use label_print_agent::services::printer::{PrintError, PrinterGateway};
use label_print_agent::services::queue::{JobQueue, QueueError, QueueTarget, ReportError};
use label_print_agent::services::stats::StatsAggregator;
use label_print_agent::services::store::{KeyValueStore, MemoryStore};

// ---------------------------------------------------------------------------
// HTTP queue
// ---------------------------------------------------------------------------

/// Queue server state. Pending jobs are handed out once, then dropped.
#[derive(Default)]
pub struct FakeQueueState {
    pub pending: Mutex<Vec<Value>>,
    pub raw_body: Mutex<Option<String>>,
    pub fetch_status: AtomicU16,
    pub report_status: AtomicU16,
    pub fetches: AtomicUsize,
    pub api_keys: Mutex<Vec<String>>,
    pub reports: Mutex<Vec<Value>>,
}

impl FakeQueueState {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

async fn list_jobs(State(state): State<Arc<FakeQueueState>>, headers: HeaderMap) -> (StatusCode, String) {
    state.fetches.fetch_add(1, Ordering::SeqCst);
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        state.api_keys.lock().await.push(key.to_string());
    }

    let status = StatusCode::from_u16(state.fetch_status.load(Ordering::SeqCst)).unwrap_or(StatusCode::OK);
    if !status.is_success() {
        return (status, "queue unavailable".to_string());
    }

    if let Some(raw) = state.raw_body.lock().await.clone() {
        return (status, raw);
    }

    let jobs: Vec<Value> = state.pending.lock().await.drain(..).collect();
    (status, json!({ "jobs": jobs }).to_string())
}

async fn update_job(
    State(state): State<Arc<FakeQueueState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        state.api_keys.lock().await.push(key.to_string());
    }
    state.reports.lock().await.push(body);
    StatusCode::from_u16(state.report_status.load(Ordering::SeqCst)).unwrap_or(StatusCode::OK)
}

/// Serve the queue API on an ephemeral port. Returns its base URL.
pub async fn spawn_fake_queue() -> (String, Arc<FakeQueueState>) {
    let state = Arc::new(FakeQueueState {
        fetch_status: AtomicU16::new(200),
        report_status: AtomicU16::new(200),
        ..Default::default()
    });

    let app = Router::new()
        .route("/api/print-jobs", get(list_jobs).put(update_job))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

/// Wait until `check` holds, polling every 20ms for up to five seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..250 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not met within 5 seconds");
}

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

/// Queue serving scripted batches, one per fetch, then empty batches.
#[derive(Default)]
pub struct ScriptedQueue {
    pub batches: Mutex<VecDeque<Vec<PrintJob>>>,
    pub unreachable: AtomicBool,
    pub fetches: AtomicUsize,
    pub reports: Mutex<Vec<StatusUpdate>>,
}

impl ScriptedQueue {
    pub fn with_batches(batches: Vec<Vec<PrintJob>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            ..Default::default()
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JobQueue for ScriptedQueue {
    async fn fetch_jobs(&self, _target: &QueueTarget) -> Result<Vec<PrintJob>, QueueError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(QueueError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(self.batches.lock().await.pop_front().unwrap_or_default())
    }

    async fn try_report_status(
        &self,
        _target: &QueueTarget,
        update: &StatusUpdate,
    ) -> Result<(), ReportError> {
        self.reports.lock().await.push(update.clone());
        Ok(())
    }
}

/// Printer that takes `delay` per document.
#[derive(Default)]
pub struct SlowPrinter {
    pub delay: Duration,
    pub submitted: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl PrinterGateway for SlowPrinter {
    async fn submit(&self, _printer: &str, job_name: &str, _document: &[u8]) -> Result<(), PrintError> {
        tokio::time::sleep(self.delay).await;
        self.submitted.lock().await.push(job_name.to_string());
        Ok(())
    }
}

pub fn ready_config(api_url: &str, test_mode: bool) -> AgentConfig {
    AgentConfig {
        api_url: api_url.to_string(),
        api_key: "test-key".to_string(),
        printer: if test_mode { String::new() } else { "Zebra_ZD420".to_string() },
        test_mode,
    }
}

pub async fn context_with(config: AgentConfig) -> Arc<AgentContext> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
    let stats = StatsAggregator::load(store.clone()).await;
    Arc::new(AgentContext::new(store, config, stats))
}

pub fn poll_loop(
    context: Arc<AgentContext>,
    queue: Arc<dyn JobQueue>,
    printer: Arc<dyn PrinterGateway>,
) -> Arc<PollLoop> {
    Arc::new(PollLoop::new(context, queue, printer, Duration::from_secs(3)))
}
