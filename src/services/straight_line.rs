use crate::constants::STRAIGHT_LINE_SEGMENTS;
use crate::error::{AppError, Result};
use crate::models::{Route, RouteRequest, TransportMode};
use crate::services::RouteService;
use async_trait::async_trait;
use std::time::Duration;

/// Offline backend: a straight polyline from origin to destination.
///
/// Distance is the haversine distance; duration assumes the mode's average
/// speed. An optional artificial latency makes completions arrive out of band
/// the way network routes do.
#[derive(Clone, Debug)]
pub struct StraightLineRouteService {
    mode: TransportMode,
    latency: Duration,
}

impl StraightLineRouteService {
    pub fn new(mode: TransportMode) -> Self {
        Self {
            mode,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl RouteService for StraightLineRouteService {
    async fn compute_route(&self, request: &RouteRequest) -> Result<Route> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if request.from == request.to {
            return Err(AppError::RoutingFailed(
                "Origin and destination are the same point".to_string(),
            ));
        }

        let path = (0..=STRAIGHT_LINE_SEGMENTS)
            .map(|i| {
                request
                    .from
                    .lerp(&request.to, i as f64 / STRAIGHT_LINE_SEGMENTS as f64)
            })
            .collect();

        let distance_km = request.from.distance_to(&request.to);
        let duration_minutes = (distance_km / self.mode.average_speed_kmh() * 60.0).round() as u32;

        tracing::debug!(
            distance_km = %format!("{:.2}", distance_km),
            mode = %self.mode,
            "Straight-line route: {:.2}km, ~{}min",
            distance_km, duration_minutes
        );

        Route::new(path, distance_km, duration_minutes)
    }

    fn backend_name(&self) -> &'static str {
        "straight_line"
    }
}
