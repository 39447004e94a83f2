mod memory;

pub use memory::CachedRouteService;

use crate::constants::ROUTE_CACHE_COORDINATE_PRECISION;
use crate::models::{RouteRequest, TransportMode};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a cache key for a point-to-point route.
/// Endpoints are rounded (~11m precision) so GPS jitter maps to the same entry.
pub fn route_cache_key(request: &RouteRequest, mode: TransportMode) -> String {
    let mut hasher = DefaultHasher::new();

    for point in [request.from, request.to] {
        let rounded = point.round(ROUTE_CACHE_COORDINATE_PRECISION);
        rounded.lat.to_bits().hash(&mut hasher);
        rounded.lng.to_bits().hash(&mut hasher);
    }
    mode.hash(&mut hasher);

    format!("route:p2p:{:x}", hasher.finish())
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}
