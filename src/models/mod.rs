pub mod coordinates;
pub mod geo;
pub mod presentation;
pub mod route;
pub mod viewport;

pub use coordinates::Coordinates;
pub use geo::BoundingBox;
pub use presentation::{Destination, DestinationId, MapPresentationState, ViewMode};
pub use route::{Route, RouteRequest, TransportMode};
pub use viewport::{EdgePadding, Span, Viewport};
