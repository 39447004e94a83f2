use crate::error::{AppError, Result};
use crate::models::{Coordinates, Route, RouteRequest, TransportMode};
use crate::services::RouteService;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const MAPBOX_DIRECTIONS_BASE_URL: &str = "https://api.mapbox.com/directions/v5/mapbox";

/// How the client authenticates with the directions API.
#[derive(Clone, Debug)]
pub enum AuthMode {
    /// Current default: send `access_token` query param (direct Mapbox).
    DirectToken,
    /// Proxy mode: send `Authorization: Bearer` header.
    BearerHeader,
}

#[derive(Clone)]
pub struct MapboxClient {
    client: Client,
    api_key: String,
    base_url: String,
    auth_mode: AuthMode,
    mode: TransportMode,
}

impl MapboxClient {
    pub fn new(api_key: String, mode: TransportMode) -> Self {
        MapboxClient {
            client: Client::new(),
            api_key,
            base_url: MAPBOX_DIRECTIONS_BASE_URL.to_string(),
            auth_mode: AuthMode::DirectToken,
            mode,
        }
    }

    pub fn with_config(
        api_key: String,
        base_url: String,
        auth_mode: AuthMode,
        mode: TransportMode,
    ) -> Self {
        MapboxClient {
            client: Client::new(),
            api_key,
            base_url,
            auth_mode,
            mode,
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    fn directions_url(&self, from: &Coordinates, to: &Coordinates) -> String {
        // Mapbox expects "lng,lat;lng,lat"
        format!(
            "{}/{}/{},{};{},{}",
            self.base_url.trim_end_matches('/'),
            self.mode.mapbox_profile(),
            from.lng,
            from.lat,
            to.lng,
            to.lat
        )
    }

    /// Get directions between two points.
    /// Returns the first route with full geometry, distance, and duration.
    pub async fn get_directions(
        &self,
        from: &Coordinates,
        to: &Coordinates,
    ) -> Result<DirectionsResponse> {
        if from == to {
            return Err(AppError::InvalidRequest(
                "Origin and destination are the same point".to_string(),
            ));
        }

        let url = self.directions_url(from, to);

        tracing::debug!(
            mode = %self.mode.mapbox_profile(),
            "Mapbox API request: ({:.5}, {:.5}) -> ({:.5}, {:.5}), profile {}",
            from.lat, from.lng, to.lat, to.lng, self.mode.mapbox_profile()
        );

        let mut request = self.client.get(&url).query(&[
            ("geometries", "geojson"),
            ("overview", "full"),
            ("steps", "false"),
        ]);

        match self.auth_mode {
            AuthMode::DirectToken => {
                request = request.query(&[("access_token", &self.api_key)]);
            }
            AuthMode::BearerHeader => {
                request = request.bearer_auth(&self.api_key);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::MapboxApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                "Mapbox API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::MapboxApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let directions: MapboxDirectionsApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::MapboxApi(format!("Failed to parse response: {}", e)))?;

        DirectionsResponse::from_api(directions, self.mode)
    }
}

#[async_trait]
impl RouteService for MapboxClient {
    async fn compute_route(&self, request: &RouteRequest) -> Result<Route> {
        let directions = self.get_directions(&request.from, &request.to).await?;
        directions.into_route()
    }

    fn backend_name(&self) -> &'static str {
        "mapbox"
    }
}

// Mapbox API response types

#[derive(Debug, Deserialize)]
struct MapboxDirectionsApiResponse {
    #[serde(default)]
    routes: Vec<MapboxRoute>,
    code: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MapboxRoute {
    distance: f64, // meters
    duration: f64, // seconds
    geometry: MapboxGeometry,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    coordinates: Vec<[f64; 2]>, // [lng, lat] pairs
    #[allow(dead_code)]
    #[serde(rename = "type")]
    geometry_type: String,
}

// Our simplified response type

#[derive(Debug, Clone, Serialize)]
pub struct DirectionsResponse {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// GeoJSON coordinates as [lng, lat] pairs
    pub geometry: Vec<[f64; 2]>,
}

impl DirectionsResponse {
    fn from_api(api: MapboxDirectionsApiResponse, mode: TransportMode) -> Result<Self> {
        if api.code != "Ok" {
            let reason = api.message.unwrap_or_else(|| api.code.clone());
            tracing::warn!(code = %api.code, "Mapbox returned {}: {}", api.code, reason);
            return Err(AppError::RoutingFailed(reason));
        }

        let Some(route) = api.routes.into_iter().next() else {
            tracing::warn!(
                mode = %mode.mapbox_profile(),
                "Mapbox returned 0 routes ({})",
                mode.mapbox_profile()
            );
            return Err(AppError::RoutingFailed("No routes found".to_string()));
        };

        tracing::debug!(
            distance_km = %format!("{:.2}", route.distance / 1000.0),
            duration_min = %format!("{:.0}", route.duration / 60.0),
            path_points = route.geometry.coordinates.len(),
            "Mapbox response: {:.2}km, {:.0}min, {} path points",
            route.distance / 1000.0, route.duration / 60.0, route.geometry.coordinates.len()
        );

        Ok(DirectionsResponse {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            geometry: route.geometry.coordinates,
        })
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds / 60.0).round() as u32
    }

    /// Convert GeoJSON coordinates to our Coordinates type
    pub fn to_coordinates(&self) -> Vec<Coordinates> {
        self.geometry
            .iter()
            .filter_map(|coord| Coordinates::new(coord[1], coord[0]).ok())
            .collect()
    }

    pub fn into_route(self) -> Result<Route> {
        Route::new(
            self.to_coordinates(),
            self.distance_km(),
            self.duration_minutes(),
        )
    }
}
