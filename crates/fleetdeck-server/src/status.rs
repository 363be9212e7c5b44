use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use fleetdeck_core::analytics::FleetAnalytics;
use fleetdeck_core::coordinator::FleetStatus;
use fleetdeck_core::time::{now, timestamp_now};

use crate::error::ApiError;
use crate::state::AppState;

/// Response for the full-fleet status query.
#[derive(Debug, Serialize)]
pub struct FleetStatusResponse {
    pub timestamp: String,
    #[serde(flatten)]
    pub status: FleetStatus,
}

/// Response wrapping the analytics aggregation.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub timestamp: String,
    pub analytics: FleetAnalytics,
}

/// GET /api/status/all — evicts stale devices, then snapshots the whole
/// registry and activity map.
pub async fn all_status(
    State(state): State<AppState>,
) -> Result<Json<FleetStatusResponse>, ApiError> {
    let status = {
        let mut coordinator = state.coordinator.write().await;
        coordinator.fleet_status(now())
    };

    Ok(Json(FleetStatusResponse {
        timestamp: timestamp_now()?,
        status,
    }))
}

/// GET /api/status/analytics — evicts stale devices, then computes the
/// aggregate analytics view.
pub async fn fleet_analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let analytics = {
        let mut coordinator = state.coordinator.write().await;
        coordinator.analytics(now())
    };

    Ok(Json(AnalyticsResponse {
        timestamp: timestamp_now()?,
        analytics,
    }))
}
