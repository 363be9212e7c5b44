use std::sync::Arc;

use tokio::sync::RwLock;

use fleetdeck_core::coordinator::FleetCoordinator;

use crate::config::ServerConfig;

pub type SharedCoordinator = Arc<RwLock<FleetCoordinator>>;

/// Shared application state. One lock around the whole coordinator gives
/// the ordering guarantees the handlers rely on: a drain can never tear an
/// in-flight enqueue, and cross-device iteration (broadcast, analytics,
/// eviction) always sees a consistent registry.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: SharedCoordinator,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let stale_after = time::Duration::seconds(config.fleet.stale_after_secs as i64);
        Self {
            coordinator: Arc::new(RwLock::new(FleetCoordinator::new(stale_after))),
            config: Arc::new(config),
        }
    }
}
