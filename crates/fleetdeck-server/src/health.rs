use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use fleetdeck_core::time::timestamp_now;

use crate::error::ApiError;
use crate::state::AppState;

/// Landing payload for GET /.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub timestamp: String,
    pub connected_devices: usize,
    pub endpoints: EndpointIndex,
}

/// Static map of the routes agents and operators use.
#[derive(Debug, Serialize)]
pub struct EndpointIndex {
    pub heartbeat: &'static str,
    pub activity: &'static str,
    pub commands: &'static str,
    pub stop: &'static str,
    pub restart: &'static str,
    pub emergency_stop: &'static str,
    pub status: &'static str,
    pub analytics: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// GET / — service banner with the endpoint index.
pub async fn home(State(state): State<AppState>) -> Result<Json<ServiceInfo>, ApiError> {
    let connected_devices = {
        let coordinator = state.coordinator.read().await;
        coordinator.device_count()
    };

    Ok(Json(ServiceInfo {
        service: "Fleet Coordination API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        timestamp: timestamp_now()?,
        connected_devices,
        endpoints: EndpointIndex {
            heartbeat: "/api/device/{id}/heartbeat",
            activity: "/api/device/{id}/activity",
            commands: "/api/device/{id}/commands",
            stop: "/api/control/stop/{id}",
            restart: "/api/control/restart/{id}",
            emergency_stop: "/api/control/emergency_stop_all",
            status: "/api/status/all",
            analytics: "/api/status/analytics",
        },
    }))
}

/// GET /health — liveness probe.
pub async fn health_check() -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "healthy",
        timestamp: timestamp_now()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use fleetdeck_core::registry::StatusReport;
    use fleetdeck_core::time::now;

    #[tokio::test]
    async fn home_reports_connected_devices() {
        let state = AppState::new(ServerConfig::default());
        {
            let mut coordinator = state.coordinator.write().await;
            coordinator.record_heartbeat("bot_a", StatusReport::default(), now());
        }

        let resp = home(State(state)).await.unwrap();
        assert_eq!(resp.status, "running");
        assert_eq!(resp.connected_devices, 1);
        assert_eq!(resp.endpoints.heartbeat, "/api/device/{id}/heartbeat");
    }

    #[tokio::test]
    async fn health_check_is_healthy() {
        let resp = health_check().await.unwrap();
        assert_eq!(resp.status, "healthy");
        assert!(!resp.timestamp.is_empty());
    }
}
