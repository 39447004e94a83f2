pub mod location;
pub mod mapbox;
pub mod route_service;
pub mod straight_line;

pub use location::{LocationFix, LocationTracker};
pub use mapbox::MapboxClient;
pub use route_service::RouteService;
pub use straight_line::StraightLineRouteService;
