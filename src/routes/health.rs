use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::status::ConnectivityStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub queue: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: ConnectivityStatus,
    pub polling: bool,
}

/// GET /health — agent liveness plus queue connectivity.
///
/// Degraded only while polling and the last fetch failed.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let polling = state.poller.is_running().await;
    let connectivity = state.context().status();

    let degraded = polling && connectivity == ConnectivityStatus::Offline;
    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let response = HealthResponse {
        status: if degraded {
            "degraded".to_string()
        } else {
            "ok".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            queue: ComponentHealth {
                status: connectivity,
                polling,
            },
        },
    };

    (status_code, Json(response))
}
