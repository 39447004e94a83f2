use crate::error::Result;
use crate::models::{Route, RouteRequest};
use async_trait::async_trait;

/// A directions backend: one origin/destination pair in, one route out.
///
/// Implementations hold no per-request state; concurrent calls are
/// independent and may complete in any order.
#[async_trait]
pub trait RouteService: Send + Sync {
    async fn compute_route(&self, request: &RouteRequest) -> Result<Route>;

    fn backend_name(&self) -> &'static str;
}
