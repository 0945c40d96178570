use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::config::AgentConfig;
use crate::models::stats::Stats;
use crate::models::status::ConnectivityStatus;
use crate::services::activity::ActivityEntry;

#[derive(Debug, Serialize)]
pub struct AgentStatusResponse {
    pub status: ConnectivityStatus,
    pub running: bool,
    pub stats: Stats,
    pub config: AgentConfig,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

async fn snapshot(state: &AppState) -> AgentStatusResponse {
    let context = state.context();
    AgentStatusResponse {
        status: context.status(),
        running: state.poller.is_running().await,
        stats: context.stats().current().await,
        config: context.config().await.redacted(),
    }
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<AgentStatusResponse> {
    Json(snapshot(&state).await)
}

/// POST /api/agent/start — begin polling, or 422 with the missing setting.
pub async fn start_agent(
    State(state): State<AppState>,
) -> Result<Json<AgentStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.poller.start().await.map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;
    Ok(Json(snapshot(&state).await))
}

/// POST /api/agent/stop
pub async fn stop_agent(State(state): State<AppState>) -> Json<AgentStatusResponse> {
    state.poller.stop().await;
    Json(snapshot(&state).await)
}

/// PUT /api/config — replace and persist the agent settings.
pub async fn save_config(
    State(state): State<AppState>,
    Json(config): Json<AgentConfig>,
) -> Result<Json<AgentStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.context().save_config(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to persist configuration");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;
    Ok(Json(snapshot(&state).await))
}

/// GET /api/activity — recent activity, oldest first.
pub async fn get_activity(State(state): State<AppState>) -> Json<Vec<ActivityEntry>> {
    Json(state.context().activity().snapshot().await)
}
