use thiserror::Error;

/// Failures that can surface from coordinator operations.
///
/// Every variant is per-request: nothing here corrupts shared state or
/// affects other devices.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
