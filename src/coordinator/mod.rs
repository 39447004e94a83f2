//! Orchestration of destination selection, location updates and routing.
//!
//! The coordinator owns the [`MapPresentationState`] and is its only writer.
//! Inbound events and routing completions are handled to completion one at a
//! time; routing itself runs on spawned tasks whose results are polled by the
//! same loop. A result is applied only if its destination is still the live
//! one. A routing task that panics completes as a routing failure.

mod events;

pub use events::{CoordinatorHandle, MapEvent};

use crate::config::ViewportConfig;
use crate::constants::DEFAULT_ANNOTATION_TITLE;
use crate::error::{AppError, Result};
use crate::models::{
    Coordinates, Destination, DestinationId, MapPresentationState, Route, RouteRequest,
};
use crate::render::{MapRenderer, OverlayStyle, RenderCommand};
use crate::services::RouteService;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub struct MapCoordinator {
    state: MapPresentationState,
    route_service: Arc<dyn RouteService>,
    renderer: Box<dyn MapRenderer>,
    overlay_style: OverlayStyle,
    /// Selection waiting for the first location fix
    pending: Option<Destination>,
    /// Spawned routing tasks, each resolving to its `RouteCompleted` event
    routing: FuturesUnordered<BoxFuture<'static, MapEvent>>,
    inbound_rx: mpsc::UnboundedReceiver<MapEvent>,
    inbound_closed: bool,
    snapshots: watch::Sender<MapPresentationState>,
}

enum Next {
    Event(MapEvent),
    InboundClosed,
}

impl MapCoordinator {
    pub fn new(
        config: ViewportConfig,
        route_service: Arc<dyn RouteService>,
        renderer: impl MapRenderer + 'static,
    ) -> (Self, CoordinatorHandle) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let state = MapPresentationState::new(config);
        let (snapshots, _) = watch::channel(state.clone());

        let coordinator = MapCoordinator {
            state,
            route_service,
            renderer: Box::new(renderer),
            overlay_style: OverlayStyle::default(),
            pending: None,
            routing: FuturesUnordered::new(),
            inbound_rx,
            inbound_closed: false,
            snapshots,
        };

        (coordinator, CoordinatorHandle::new(inbound_tx))
    }

    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    pub fn state(&self) -> &MapPresentationState {
        &self.state
    }

    pub fn pending_destination(&self) -> Option<&Destination> {
        self.pending.as_ref()
    }

    /// Routing requests dispatched whose completion has not been received yet.
    pub fn in_flight(&self) -> usize {
        self.routing.len()
    }

    /// Latest presentation state, republished after every event that changed it.
    pub fn subscribe(&self) -> watch::Receiver<MapPresentationState> {
        self.snapshots.subscribe()
    }

    /// Handle events until every handle is dropped and all dispatched routing
    /// requests have completed.
    pub async fn run(mut self) {
        tracing::info!(
            backend = self.route_service.backend_name(),
            "Map coordinator started"
        );
        while self.step().await {}
        tracing::info!("Map coordinator stopped");
    }

    /// Wait for the next inbound event or routing completion and handle it.
    /// Returns `false` once there is nothing left to wait for.
    pub async fn step(&mut self) -> bool {
        loop {
            if self.inbound_closed && self.routing.is_empty() {
                return false;
            }

            let next = tokio::select! {
                biased;
                event = self.inbound_rx.recv(), if !self.inbound_closed => match event {
                    Some(event) => Next::Event(event),
                    None => Next::InboundClosed,
                },
                Some(event) = self.routing.next(), if !self.routing.is_empty() => {
                    Next::Event(event)
                }
            };

            match next {
                Next::Event(event) => {
                    self.handle_event(event);
                    return true;
                }
                Next::InboundClosed => {
                    tracing::debug!(
                        in_flight = self.routing.len(),
                        "All coordinator handles dropped, draining {} routing request(s)",
                        self.routing.len()
                    );
                    self.inbound_closed = true;
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: MapEvent) {
        let changed = match event {
            MapEvent::DestinationSelected { coordinates, label } => {
                self.on_destination_selected(coordinates, label);
                true
            }
            MapEvent::DestinationCleared => {
                self.on_destination_cleared();
                true
            }
            MapEvent::LocationUpdated(coordinates) => {
                self.on_user_location_updated(coordinates);
                true
            }
            MapEvent::RouteCompleted {
                destination_id,
                request,
                result,
            } => self.on_route_completed(destination_id, request, result),
        };

        // Discarded and failed completions leave the state as it was
        if changed {
            self.snapshots.send_replace(self.state.clone());
        }
    }

    pub fn on_destination_selected(&mut self, coordinates: Coordinates, label: String) {
        let title = if label.trim().is_empty() {
            DEFAULT_ANNOTATION_TITLE.to_string()
        } else {
            label
        };

        // Supersedes any pending or in-flight request for an older selection
        let destination = self.state.select_destination(coordinates, title);
        self.pending = None;

        tracing::info!(
            destination_id = %destination.id,
            lat = coordinates.lat,
            lng = coordinates.lng,
            "Destination selected: '{}' ({:.5}, {:.5})",
            destination.label, coordinates.lat, coordinates.lng
        );

        self.render(RenderCommand::HideRouteOverlay);
        self.render(RenderCommand::HideAllAnnotations);
        self.render(RenderCommand::ShowAnnotation {
            coordinates,
            title: destination.label.clone(),
        });

        self.request_route(destination);
    }

    pub fn on_destination_cleared(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(
                destination_id = %pending.id,
                "Dropping deferred route request for '{}'",
                pending.label
            );
        }

        let viewport = self.state.clear();
        tracing::info!(in_flight = self.routing.len(), "Destination cleared");

        self.render(RenderCommand::HideRouteOverlay);
        self.render(RenderCommand::HideAllAnnotations);
        if let Some(viewport) = viewport {
            self.render(RenderCommand::SetViewport(viewport));
        }
    }

    pub fn on_user_location_updated(&mut self, coordinates: Coordinates) {
        if let Some(viewport) = self.state.update_user_location(coordinates) {
            self.render(RenderCommand::SetViewport(viewport));
        }

        if let Some(destination) = self.pending.take() {
            tracing::debug!(
                destination_id = %destination.id,
                "First location fix, issuing deferred route request for '{}'",
                destination.label
            );
            self.dispatch(coordinates, destination);
        }
    }

    /// Returns whether the presentation state changed.
    fn on_route_completed(
        &mut self,
        destination_id: DestinationId,
        request: RouteRequest,
        result: Result<Route>,
    ) -> bool {
        match result {
            Ok(route) => {
                let polyline = route.path.clone();
                let distance_km = route.distance_km;
                match self.state.apply_route(route, destination_id) {
                    Ok(viewport) => {
                        tracing::info!(
                            destination_id = %destination_id,
                            distance_km = %format!("{:.2}", distance_km),
                            path_points = polyline.len(),
                            "Route applied: {:.2}km, {} points",
                            distance_km, polyline.len()
                        );
                        self.render(RenderCommand::ShowRouteOverlay {
                            polyline,
                            style: self.overlay_style.clone(),
                        });
                        self.render(RenderCommand::SetViewport(viewport));
                        true
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Discarding route");
                        false
                    }
                }
            }
            Err(e) if self.is_current(destination_id) => {
                // Annotation stays, overlay stays hidden; no retry
                if e.is_routing_failure() {
                    tracing::warn!(
                        destination_id = %destination_id,
                        error = %e,
                        "No route shown for ({:.5}, {:.5}) -> ({:.5}, {:.5}): {}",
                        request.from.lat, request.from.lng, request.to.lat, request.to.lng, e
                    );
                } else {
                    tracing::error!(
                        destination_id = %destination_id,
                        error = %e,
                        "Route service error: {}",
                        e
                    );
                }
                false
            }
            Err(e) => {
                let stale = AppError::StaleResult { destination_id };
                tracing::debug!(error = %e, "{}, ignoring failure", stale);
                false
            }
        }
    }

    fn is_current(&self, destination_id: DestinationId) -> bool {
        self.state
            .destination()
            .is_some_and(|d| d.id == destination_id)
    }

    fn request_route(&mut self, destination: Destination) {
        match self
            .state
            .user_location()
            .ok_or(AppError::LocationUnavailable)
        {
            Ok(from) => self.dispatch(from, destination),
            Err(e) => {
                tracing::debug!(
                    destination_id = %destination.id,
                    "{}; deferring route request for '{}'",
                    e, destination.label
                );
                self.pending = Some(destination);
            }
        }
    }

    fn dispatch(&mut self, from: Coordinates, destination: Destination) {
        let request = RouteRequest::new(from, destination.coordinates);
        let destination_id = destination.id;
        let service = Arc::clone(&self.route_service);

        tracing::debug!(
            destination_id = %destination_id,
            in_flight = self.routing.len() + 1,
            "Requesting route from {}",
            service.backend_name()
        );

        let task = tokio::spawn(async move { service.compute_route(&request).await });

        self.routing.push(Box::pin(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(AppError::RoutingFailed(format!("Routing task failed: {}", e))),
            };
            MapEvent::RouteCompleted {
                destination_id,
                request,
                result,
            }
        }));
    }

    fn render(&mut self, command: RenderCommand) {
        self.renderer.render(&command);
    }
}
