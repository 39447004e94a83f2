use crate::models::DestinationId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User location unavailable: no fix received yet")]
    LocationUnavailable,

    #[error("Routing failed: {0}")]
    RoutingFailed(String),

    #[error("Stale route result for superseded destination {destination_id}")]
    StaleResult { destination_id: DestinationId },

    #[error("Mapbox API error: {0}")]
    MapboxApi(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Map coordinator has shut down")]
    CoordinatorClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Errors that the coordinator degrades to "no route shown" rather than surfacing.
    pub fn is_routing_failure(&self) -> bool {
        matches!(
            self,
            AppError::RoutingFailed(_) | AppError::MapboxApi(_) | AppError::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
