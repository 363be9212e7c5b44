use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;

use fleetdeck_core::activity::ActivityReport;
use fleetdeck_core::command::Command;
use fleetdeck_core::registry::StatusReport;
use fleetdeck_core::time::{now, timestamp_now};

use crate::error::ApiError;
use crate::state::AppState;

/// Response for an accepted heartbeat.
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    pub timestamp: String,
}

/// Response for an accepted activity report.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub success: bool,
}

/// Response for a command poll.
#[derive(Debug, Serialize)]
pub struct PendingCommandsResponse {
    pub commands: Vec<Command>,
    pub timestamp: String,
}

/// POST /api/device/{id}/heartbeat — agents report liveness every 30s.
/// An absent or malformed body is treated as empty; fields default rather
/// than reject.
pub async fn device_heartbeat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    let value = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let report = StatusReport::from_json(&value);
    tracing::info!(device_id = %id, actions = ?report.actions_today, "heartbeat");

    {
        let mut coordinator = state.coordinator.write().await;
        coordinator.record_heartbeat(&id, report, now());
    }

    Ok(Json(HeartbeatResponse {
        success: true,
        timestamp: timestamp_now()?,
    }))
}

/// POST /api/device/{id}/activity — agents report completed actions.
pub async fn device_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let value = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let report = ActivityReport::from_json(&value);

    let entry = {
        let mut coordinator = state.coordinator.write().await;
        coordinator.record_activity(&id, report, now())?
    };
    tracing::info!(device_id = %id, action = %entry.action, "activity recorded");

    Ok(Json(ActivityResponse { success: true }))
}

/// GET /api/device/{id}/commands — agents poll every 10s. Read-and-clear:
/// the queue is empty once this returns, delivered or not.
pub async fn pending_commands(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PendingCommandsResponse>, ApiError> {
    let commands = {
        let mut coordinator = state.coordinator.write().await;
        coordinator.drain_commands(&id)
    };

    if !commands.is_empty() {
        tracing::info!(device_id = %id, count = commands.len(), "delivering commands");
    }

    Ok(Json(PendingCommandsResponse {
        commands,
        timestamp: timestamp_now()?,
    }))
}
