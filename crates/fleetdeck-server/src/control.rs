use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use serde_json::{Map, Value, json};

use fleetdeck_core::time::now;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for a targeted control command.
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub success: bool,
    pub message: String,
}

/// Response for a fleet-wide broadcast.
#[derive(Debug, Serialize)]
pub struct EmergencyStopResponse {
    pub success: bool,
    pub message: String,
    pub devices: Vec<String>,
}

/// Queue a command for one device and log, warning when the device's queue
/// keeps growing unread.
async fn enqueue(
    state: &AppState,
    id: &str,
    action: &str,
    parameters: Map<String, Value>,
) -> Result<(), ApiError> {
    let (command, depth) = {
        let mut coordinator = state.coordinator.write().await;
        coordinator.enqueue_command(id, action, parameters, now())?
    };
    tracing::info!(device_id = %id, command_id = %command.command_id, action, "command queued");

    if depth >= state.config.fleet.queue_depth_alarm {
        tracing::warn!(
            device_id = %id,
            depth,
            "pending-command queue is deep; device may have stopped polling"
        );
    }
    Ok(())
}

/// POST /api/control/stop/{id} — stop one device.
pub async fn stop_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ControlResponse>, ApiError> {
    let mut params = Map::new();
    params.insert("reason".to_string(), json!("Manual stop from Control Room"));
    enqueue(&state, &id, "stop_bot", params).await?;

    Ok(Json(ControlResponse {
        success: true,
        message: format!("Stop command sent to {id}"),
    }))
}

/// POST /api/control/restart/{id} — restart one device, forwarding any
/// body parameters verbatim.
pub async fn restart_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<ControlResponse>, ApiError> {
    let params = body
        .and_then(|Json(v)| v.as_object().cloned())
        .unwrap_or_default();
    enqueue(&state, &id, "restart_bot", params).await?;

    Ok(Json(ControlResponse {
        success: true,
        message: format!("Restart command sent to {id}"),
    }))
}

/// POST /api/control/emergency_stop_all — fan out to every device known
/// right now. Devices that register later are not targeted.
pub async fn emergency_stop_all(
    State(state): State<AppState>,
) -> Result<Json<EmergencyStopResponse>, ApiError> {
    let mut params = Map::new();
    params.insert("priority".to_string(), json!("critical"));

    let devices = {
        let mut coordinator = state.coordinator.write().await;
        coordinator.broadcast("emergency_stop", params, now())?
    };
    tracing::warn!(count = devices.len(), "emergency stop broadcast");

    Ok(Json(EmergencyStopResponse {
        success: true,
        message: format!("Emergency stop sent to {} devices", devices.len()),
        devices,
    }))
}
