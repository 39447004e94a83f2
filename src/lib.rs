// Library exports for the binary and integration tests

pub mod cache;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod render;
pub mod replay;
pub mod services;

// Re-export commonly used types
pub use coordinator::{CoordinatorHandle, MapCoordinator, MapEvent};
pub use error::{AppError, Result};
