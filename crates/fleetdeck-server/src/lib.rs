pub mod api;
pub mod config;
pub mod control;
pub mod error;
pub mod health;
pub mod state;
pub mod status;

use axum::Router;
use tower_http::cors::CorsLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let state = AppState::new(config);

    // Agent-facing routes, polled by the fleet itself
    let device_routes = Router::new()
        .route(
            "/{id}/heartbeat",
            axum::routing::post(api::device_heartbeat),
        )
        .route("/{id}/activity", axum::routing::post(api::device_activity))
        .route("/{id}/commands", axum::routing::get(api::pending_commands));

    // Operator routes from the Control Room dashboard
    let control_routes = Router::new()
        .route("/stop/{id}", axum::routing::post(control::stop_device))
        .route("/restart/{id}", axum::routing::post(control::restart_device))
        .route(
            "/emergency_stop_all",
            axum::routing::post(control::emergency_stop_all),
        );

    let status_routes = Router::new()
        .route("/all", axum::routing::get(status::all_status))
        .route("/analytics", axum::routing::get(status::fleet_analytics));

    let app = Router::new()
        .route("/", axum::routing::get(health::home))
        .route("/health", axum::routing::get(health::health_check))
        .nest("/api/device", device_routes)
        .nest("/api/control", control_routes)
        .nest("/api/status", status_routes)
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}
