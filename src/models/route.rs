use crate::error::{AppError, Result};
use crate::models::geo::BoundingBox;
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Drive,
    Walk,
    Bike,
}

impl TransportMode {
    /// Returns the Mapbox profile name for this transport mode
    pub fn mapbox_profile(&self) -> &str {
        match self {
            TransportMode::Drive => "driving",
            TransportMode::Walk => "walking",
            TransportMode::Bike => "cycling",
        }
    }

    /// Rough average speed used when a backend has no duration of its own.
    pub fn average_speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Drive => 40.0,
            TransportMode::Walk => 5.0,
            TransportMode::Bike => 15.0,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Drive => write!(f, "drive"),
            TransportMode::Walk => write!(f, "walk"),
            TransportMode::Bike => write!(f, "bike"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drive" | "driving" | "car" => Ok(TransportMode::Drive),
            "walk" | "walking" => Ok(TransportMode::Walk),
            "bike" | "cycling" | "bicycle" => Ok(TransportMode::Bike),
            _ => Err(format!("Invalid transport mode: '{}'", s)),
        }
    }
}

/// One routing request: a single origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteRequest {
    pub from: Coordinates,
    pub to: Coordinates,
}

impl RouteRequest {
    pub fn new(from: Coordinates, to: Coordinates) -> Self {
        RouteRequest { from, to }
    }
}

/// Immutable result of a successful routing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: Uuid,
    /// Polyline geometry, origin first
    pub path: Vec<Coordinates>,
    /// Envelope of `path`, used for viewport fitting
    pub extent: BoundingBox,
    pub distance_km: f64,
    pub estimated_duration_minutes: u32,
}

impl Route {
    /// Build a route from its geometry. A path with fewer than two points is
    /// not a route and is reported as a routing failure.
    pub fn new(
        path: Vec<Coordinates>,
        distance_km: f64,
        estimated_duration_minutes: u32,
    ) -> Result<Self> {
        if path.len() < 2 {
            return Err(AppError::RoutingFailed(format!(
                "Route geometry needs at least 2 points, got {}",
                path.len()
            )));
        }
        let extent = BoundingBox::from_path(&path)
            .ok_or_else(|| AppError::RoutingFailed("Route geometry is empty".to_string()))?;

        Ok(Route {
            id: Uuid::new_v4(),
            path,
            extent,
            distance_km,
            estimated_duration_minutes,
        })
    }

    pub fn origin(&self) -> Coordinates {
        self.path[0]
    }

    pub fn destination(&self) -> Coordinates {
        self.path[self.path.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn test_route_requires_two_points() {
        assert!(matches!(
            Route::new(vec![], 0.0, 0),
            Err(AppError::RoutingFailed(_))
        ));
        assert!(matches!(
            Route::new(vec![c(1.0, 1.0)], 0.0, 0),
            Err(AppError::RoutingFailed(_))
        ));
    }

    #[test]
    fn test_route_extent_and_endpoints() {
        let route = Route::new(vec![c(0.0, 0.0), c(5.0, 2.0), c(10.0, 10.0)], 1570.0, 1200)
            .unwrap();

        assert_eq!(route.origin(), c(0.0, 0.0));
        assert_eq!(route.destination(), c(10.0, 10.0));
        assert_eq!(route.extent.min_lat, 0.0);
        assert_eq!(route.extent.max_lng, 10.0);
    }

    #[test]
    fn test_transport_mode_mapbox_profile() {
        assert_eq!(TransportMode::Drive.mapbox_profile(), "driving");
        assert_eq!(TransportMode::Walk.mapbox_profile(), "walking");
        assert_eq!(TransportMode::Bike.mapbox_profile(), "cycling");
    }

    #[test]
    fn test_transport_mode_display() {
        assert_eq!(TransportMode::Drive.to_string(), "drive");
        assert_eq!(TransportMode::Walk.to_string(), "walk");
        assert_eq!(TransportMode::Bike.to_string(), "bike");
    }

    #[test]
    fn test_transport_mode_from_str() {
        assert_eq!(
            "drive".parse::<TransportMode>().unwrap(),
            TransportMode::Drive
        );
        assert_eq!(
            "WALK".parse::<TransportMode>().unwrap(),
            TransportMode::Walk
        );
        assert_eq!(
            "cycling".parse::<TransportMode>().unwrap(),
            TransportMode::Bike
        );
        assert!("teleport".parse::<TransportMode>().is_err());
    }

    #[test]
    fn test_transport_mode_default() {
        assert_eq!(TransportMode::default(), TransportMode::Drive);
    }
}
