use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::context::AgentContext;

#[derive(Clone)]
pub struct MetricsState {
    pub handle: Arc<PrometheusHandle>,
    pub context: Arc<AgentContext>,
}

/// GET /metrics — Prometheus text exposition. Session gauges are refreshed
/// on every scrape.
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let stats = state.context.stats().current().await;
    metrics::gauge!("labels_today").set(stats.labels_today as f64);
    metrics::gauge!("queue_connectivity").set(state.context.status().as_gauge());
    state.handle.render()
}
