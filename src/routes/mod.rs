pub mod agent;
pub mod health;
pub mod metrics;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Control API consumed by the desktop UI.
pub fn router(state: AppState, prometheus: Arc<PrometheusHandle>) -> Router {
    let metrics_state = metrics::MetricsState {
        handle: prometheus,
        context: state.context().clone(),
    };

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/status", get(agent::get_status))
        .route("/api/agent/start", post(agent::start_agent))
        .route("/api/agent/stop", post(agent::stop_agent))
        .route("/api/config", put(agent::save_config))
        .route("/api/activity", get(agent::get_activity))
        .with_state(state)
        .route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(metrics_state),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
