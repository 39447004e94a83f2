use crate::cache::{route_cache_key, CacheStats};
use crate::error::Result;
use crate::models::{Route, RouteRequest, TransportMode};
use crate::services::RouteService;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Route service decorator backed by an in-memory moka cache with TTL and
/// bounded capacity. Only successful routes are cached.
/// All methods are `&self`, so it stays reentrant like the service it wraps.
pub struct CachedRouteService {
    inner: Arc<dyn RouteService>,
    mode: TransportMode,
    routes: Cache<String, Arc<Route>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedRouteService {
    pub fn new(
        inner: Arc<dyn RouteService>,
        mode: TransportMode,
        ttl_seconds: u64,
        max_capacity: u64,
    ) -> Self {
        let routes = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        CachedRouteService {
            inner,
            mode,
            routes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
        }
    }
}

#[async_trait]
impl RouteService for CachedRouteService {
    async fn compute_route(&self, request: &RouteRequest) -> Result<Route> {
        let key = route_cache_key(request, self.mode);

        if let Some(route) = self.routes.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Memory cache hit for route: {}", key);
            return Ok((*route).clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            backend = self.inner.backend_name(),
            "Memory cache miss for route: {}",
            key
        );

        let route = self.inner.compute_route(request).await?;
        self.routes.insert(key, Arc::new(route.clone())).await;
        Ok(route)
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
