use crate::error::{AppError, Result};
use crate::models::{Coordinates, DestinationId, Route, RouteRequest};
use tokio::sync::mpsc;

/// Everything the coordinator reacts to. Handled strictly one at a time.
#[derive(Debug)]
pub enum MapEvent {
    DestinationSelected {
        coordinates: Coordinates,
        label: String,
    },
    DestinationCleared,
    LocationUpdated(Coordinates),
    /// A routing request finished. Completions re-enter the queue in
    /// completion order, which need not match request order.
    RouteCompleted {
        destination_id: DestinationId,
        request: RouteRequest,
        result: Result<Route>,
    },
}

/// Inbound side of the coordinator, given to the destination-search and
/// location collaborators. Cheap to clone. The coordinator stops once every
/// handle is dropped and no routing request is outstanding.
#[derive(Clone, Debug)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<MapEvent>,
}

impl CoordinatorHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<MapEvent>) -> Self {
        CoordinatorHandle { tx }
    }

    pub fn destination_selected(
        &self,
        coordinates: Coordinates,
        label: impl Into<String>,
    ) -> Result<()> {
        self.send(MapEvent::DestinationSelected {
            coordinates,
            label: label.into(),
        })
    }

    pub fn destination_cleared(&self) -> Result<()> {
        self.send(MapEvent::DestinationCleared)
    }

    pub fn location_updated(&self, coordinates: Coordinates) -> Result<()> {
        self.send(MapEvent::LocationUpdated(coordinates))
    }

    fn send(&self, event: MapEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| AppError::CoordinatorClosed)
    }
}
