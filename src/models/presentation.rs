use crate::config::ViewportConfig;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Route, Viewport};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Idle,
    DestinationSelected,
}

/// Identity of one selection event. Two selections of the same coordinates
/// get different ids, so a route requested for the first cannot be applied
/// to the second.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct DestinationId(Uuid);

impl DestinationId {
    pub fn new() -> Self {
        DestinationId(Uuid::new_v4())
    }
}

impl Default for DestinationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Destination {
    pub id: DestinationId,
    pub coordinates: Coordinates,
    pub label: String,
}

/// The single live presentation of the map.
///
/// Invariants, held after every operation:
/// - a route is present only in `DestinationSelected` mode with a destination set
/// - returning to `Idle` drops destination and route together
/// - only a route computed for the current destination is ever stored
#[derive(Debug, Clone, Serialize)]
pub struct MapPresentationState {
    mode: ViewMode,
    user_location: Option<Coordinates>,
    destination: Option<Destination>,
    route: Option<Route>,
    viewport: Option<Viewport>,
    #[serde(skip)]
    config: ViewportConfig,
}

impl MapPresentationState {
    pub fn new(config: ViewportConfig) -> Self {
        MapPresentationState {
            mode: ViewMode::Idle,
            user_location: None,
            destination: None,
            route: None,
            viewport: None,
            config,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Return to Idle. Returns the follow-user viewport when one could be
    /// computed; otherwise the viewport is left as it was.
    pub fn clear(&mut self) -> Option<Viewport> {
        self.mode = ViewMode::Idle;
        self.destination = None;
        self.route = None;

        let user = self.user_location?;
        let viewport = Viewport::follow_user(user, &self.config);
        self.viewport = Some(viewport);
        Some(viewport)
    }

    /// Make `coordinates` the live destination. Any route shown for a previous
    /// destination is dropped immediately.
    pub fn select_destination(&mut self, coordinates: Coordinates, label: String) -> Destination {
        let destination = Destination {
            id: DestinationId::new(),
            coordinates,
            label,
        };
        self.mode = ViewMode::DestinationSelected;
        self.route = None;
        self.destination = Some(destination.clone());
        destination
    }

    /// Store `route` if it was computed for the current destination and fit
    /// the viewport to it. Anything else is a [`AppError::StaleResult`].
    pub fn apply_route(
        &mut self,
        route: Route,
        for_destination: DestinationId,
    ) -> Result<Viewport> {
        let is_current = self
            .destination
            .as_ref()
            .is_some_and(|d| d.id == for_destination);
        if !is_current || self.mode != ViewMode::DestinationSelected {
            return Err(AppError::StaleResult {
                destination_id: for_destination,
            });
        }

        let viewport = Viewport::fit_route(&route.extent, &self.config);
        self.route = Some(route);
        self.viewport = Some(viewport);
        Ok(viewport)
    }

    /// Store the latest user fix. Only moves the viewport in Idle mode.
    pub fn update_user_location(&mut self, coordinates: Coordinates) -> Option<Viewport> {
        self.user_location = Some(coordinates);

        match self.mode {
            ViewMode::Idle => {
                let viewport = Viewport::follow_user(coordinates, &self.config);
                self.viewport = Some(viewport);
                Some(viewport)
            }
            ViewMode::DestinationSelected => None,
        }
    }
}
