use async_trait::async_trait;
use routemap::config::ViewportConfig;
use routemap::coordinator::{CoordinatorHandle, MapCoordinator};
use routemap::models::{Coordinates, Route, RouteRequest};
use routemap::render::RecordingRenderer;
use routemap::services::RouteService;
use routemap::{AppError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A routing request held open until the test answers it.
pub struct PendingRoute {
    pub request: RouteRequest,
    reply: oneshot::Sender<Result<Route>>,
}

impl PendingRoute {
    #[allow(dead_code)]
    pub fn succeed(self) -> Route {
        let route = straight_route(self.request.from, self.request.to);
        let _ = self.reply.send(Ok(route.clone()));
        route
    }

    #[allow(dead_code)]
    pub fn fail(self, reason: &str) {
        let _ = self.reply.send(Err(AppError::RoutingFailed(reason.to_string())));
    }
}

/// Route service whose calls complete only when the test says so, in
/// whatever order the test picks.
pub struct GatedRouteService {
    requests: mpsc::UnboundedSender<PendingRoute>,
}

#[async_trait]
impl RouteService for GatedRouteService {
    async fn compute_route(&self, request: &RouteRequest) -> Result<Route> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(PendingRoute {
                request: *request,
                reply,
            })
            .map_err(|_| AppError::RoutingFailed("test gate closed".to_string()))?;

        response
            .await
            .map_err(|_| AppError::RoutingFailed("request abandoned".to_string()))?
    }

    fn backend_name(&self) -> &'static str {
        "gated"
    }
}

pub struct Harness {
    pub handle: CoordinatorHandle,
    pub renderer: RecordingRenderer,
    pub requests: mpsc::UnboundedReceiver<PendingRoute>,
}

/// Build a coordinator on a gated route service. The coordinator is returned
/// unstarted so tests can drive it with `step()`.
#[allow(dead_code)]
pub fn setup_coordinator() -> (MapCoordinator, Harness) {
    let (tx, requests) = mpsc::unbounded_channel();
    let renderer = RecordingRenderer::new();
    let (coordinator, handle) = MapCoordinator::new(
        ViewportConfig::default(),
        Arc::new(GatedRouteService { requests: tx }),
        renderer.clone(),
    );

    (
        coordinator,
        Harness {
            handle,
            renderer,
            requests,
        },
    )
}

/// Wait for the coordinator to issue its next routing request.
#[allow(dead_code)]
pub async fn next_request(requests: &mut mpsc::UnboundedReceiver<PendingRoute>) -> PendingRoute {
    tokio::time::timeout(Duration::from_secs(2), requests.recv())
        .await
        .expect("Timed out waiting for a route request")
        .expect("Route request channel closed")
}

#[allow(dead_code)]
pub fn straight_route(from: Coordinates, to: Coordinates) -> Route {
    Route::new(vec![from, from.lerp(&to, 0.5), to], from.distance_to(&to), 10).unwrap()
}

#[allow(dead_code)]
pub fn c(lat: f64, lng: f64) -> Coordinates {
    Coordinates::new(lat, lng).unwrap()
}

/// Check if we should skip real API tests
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok() || std::env::var("MAPBOX_API_KEY").is_err()
}
