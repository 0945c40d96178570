use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

use label_print_agent::{
    app_state::AppState,
    config::AppConfig,
    context::AgentContext,
    routes,
    services::{
        poller::PollLoop, printer::SystemPrinter, queue::HttpJobQueue, store::JsonFileStore,
    },
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing label print agent");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!("poll_failures_total", "Queue fetches that failed");
    metrics::describe_counter!("print_jobs_completed_total", "Print jobs reported completed");
    metrics::describe_counter!("print_jobs_failed_total", "Print jobs reported failed");
    metrics::describe_counter!("labels_printed_total", "Labels recorded in stats");
    metrics::describe_counter!(
        "status_report_failures_total",
        "Status updates the queue did not accept"
    );
    metrics::describe_gauge!("labels_today", "Labels printed today");
    metrics::describe_gauge!(
        "queue_connectivity",
        "Queue connectivity: 0 offline, 0.5 connecting, 1 online"
    );

    // Load persisted settings and counters
    tracing::info!(path = %config.store_path, "Opening settings store");
    let store = JsonFileStore::open(&config.store_path)
        .await
        .expect("Failed to open settings store");
    let context = AgentContext::load(Arc::new(store), config.seed()).await;

    let queue = HttpJobQueue::new().expect("Failed to initialize queue client");
    let printer = match &config.sumatra_path {
        Some(path) => SystemPrinter::new().with_sumatra_path(path),
        None => SystemPrinter::new(),
    };
    let poller = PollLoop::new(
        Arc::new(context),
        Arc::new(queue),
        Arc::new(printer),
        Duration::from_secs(config.poll_interval_secs.max(1)),
    );
    let state = AppState::new(poller);

    if config.autostart {
        if let Err(e) = state.poller.start().await {
            tracing::warn!(error = %e, "Autostart skipped");
        }
    }

    let app = routes::router(state.clone(), prometheus_handle);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Control API listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .expect("Server error");

    state.poller.shutdown().await;
    tracing::info!("Label print agent stopped");
}
