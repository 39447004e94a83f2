use crate::constants::*;
use crate::models::{EdgePadding, TransportMode};
use crate::render::OverlayStyle;
use std::env;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RouteBackend {
    #[default]
    Mapbox,
    StraightLine, // Offline interpolation, no network
}

impl std::str::FromStr for RouteBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mapbox" => Ok(RouteBackend::Mapbox),
            "straight_line" | "straight-line" => Ok(RouteBackend::StraightLine),
            _ => Err(format!(
                "Invalid route backend: {}. Use 'mapbox' or 'straight_line'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub route_backend: RouteBackend,
    pub mapbox_api_key: Option<String>, // Required only for the Mapbox backend
    pub mapbox_base_url: Option<String>,
    pub transport_mode: TransportMode,
    pub route_cache_ttl: u64,
    pub route_cache_max_entries: u64,
    pub location_min_distance_m: f64,
    pub viewport: ViewportConfig,
    pub overlay_style: OverlayStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    /// Span (degrees per axis) of the follow-user viewport
    pub follow_user_span_deg: f64,

    /// Lower bound (degrees per axis) of a fitted route viewport
    pub min_route_span_deg: f64,

    /// Insets the fitted route must stay clear of
    pub edge_padding: EdgePadding,

    /// Map view size in device-independent points, used to convert the
    /// padding into coordinate span
    pub view_width_pt: f64,
    pub view_height_pt: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            follow_user_span_deg: DEFAULT_FOLLOW_USER_SPAN_DEG,
            min_route_span_deg: DEFAULT_MIN_ROUTE_SPAN_DEG,
            edge_padding: EdgePadding::new(
                DEFAULT_EDGE_PADDING_TOP,
                DEFAULT_EDGE_PADDING_LEFT,
                DEFAULT_EDGE_PADDING_BOTTOM,
                DEFAULT_EDGE_PADDING_RIGHT,
            ),
            view_width_pt: DEFAULT_VIEW_WIDTH_PT,
            view_height_pt: DEFAULT_VIEW_HEIGHT_PT,
        }
    }
}

impl ViewportConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let (view_width_pt, view_height_pt) = match env::var("MAP_VIEW_SIZE") {
            Ok(size) => parse_view_size(&size)?,
            Err(_) => (defaults.view_width_pt, defaults.view_height_pt),
        };

        let config = Self {
            follow_user_span_deg: env::var("MAP_FOLLOW_USER_SPAN_DEG")
                .unwrap_or_else(|_| defaults.follow_user_span_deg.to_string())
                .parse()
                .map_err(|_| "Invalid MAP_FOLLOW_USER_SPAN_DEG")?,

            min_route_span_deg: env::var("MAP_MIN_ROUTE_SPAN_DEG")
                .unwrap_or_else(|_| defaults.min_route_span_deg.to_string())
                .parse()
                .map_err(|_| "Invalid MAP_MIN_ROUTE_SPAN_DEG")?,

            edge_padding: match env::var("MAP_EDGE_PADDING") {
                Ok(padding) => padding.parse()?,
                Err(_) => defaults.edge_padding,
            },

            view_width_pt,
            view_height_pt,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.follow_user_span_deg > 0.0 && self.follow_user_span_deg <= 180.0) {
            return Err("MAP_FOLLOW_USER_SPAN_DEG must be between 0 and 180".to_string());
        }
        if !(self.min_route_span_deg > 0.0 && self.min_route_span_deg <= 180.0) {
            return Err("MAP_MIN_ROUTE_SPAN_DEG must be between 0 and 180".to_string());
        }
        if self.edge_padding.horizontal() >= self.view_width_pt {
            return Err(format!(
                "Horizontal edge padding ({}) must be smaller than the view width ({})",
                self.edge_padding.horizontal(),
                self.view_width_pt
            ));
        }
        if self.edge_padding.vertical() >= self.view_height_pt {
            return Err(format!(
                "Vertical edge padding ({}) must be smaller than the view height ({})",
                self.edge_padding.vertical(),
                self.view_height_pt
            ));
        }
        Ok(())
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `390x844`.
fn parse_view_size(s: &str) -> Result<(f64, f64), String> {
    let (width, height) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("MAP_VIEW_SIZE must be WIDTHxHEIGHT, got '{}'", s))?;
    let width: f64 = width
        .trim()
        .parse()
        .map_err(|_| format!("Invalid MAP_VIEW_SIZE width: '{}'", s))?;
    let height: f64 = height
        .trim()
        .parse()
        .map_err(|_| format!("Invalid MAP_VIEW_SIZE height: '{}'", s))?;

    if !(width > 0.0 && height > 0.0) {
        return Err(format!("MAP_VIEW_SIZE must be positive, got '{}'", s));
    }
    Ok((width, height))
}

/// Route overlay stroke from `MAP_OVERLAY_COLOR` and `MAP_OVERLAY_LINE_WIDTH`.
fn overlay_style_from_env() -> Result<OverlayStyle, String> {
    let defaults = OverlayStyle::default();

    let stroke_color = env::var("MAP_OVERLAY_COLOR").unwrap_or(defaults.stroke_color);
    let is_hex = stroke_color.len() == 7
        && stroke_color.starts_with('#')
        && stroke_color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !is_hex {
        return Err(format!("MAP_OVERLAY_COLOR must be #RRGGBB, got '{}'", stroke_color));
    }

    let line_width: f64 = env::var("MAP_OVERLAY_LINE_WIDTH")
        .unwrap_or_else(|_| defaults.line_width.to_string())
        .parse()
        .map_err(|_| "Invalid MAP_OVERLAY_LINE_WIDTH")?;
    if !(line_width > 0.0 && line_width.is_finite()) {
        return Err("MAP_OVERLAY_LINE_WIDTH must be positive".to_string());
    }

    Ok(OverlayStyle {
        stroke_color,
        line_width,
    })
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let route_backend: RouteBackend = env::var("ROUTE_BACKEND")
            .unwrap_or_else(|_| "mapbox".to_string())
            .parse()?;

        let mapbox_api_key = env::var("MAPBOX_API_KEY").ok().filter(|k| !k.is_empty());
        if route_backend == RouteBackend::Mapbox && mapbox_api_key.is_none() {
            return Err("MAPBOX_API_KEY must be set when ROUTE_BACKEND=mapbox".to_string());
        }

        // Parse and validate the location distance filter
        let location_min_distance_m: f64 = env::var("LOCATION_MIN_DISTANCE_M")
            .unwrap_or_else(|_| DEFAULT_LOCATION_MIN_DISTANCE_M.to_string())
            .parse()
            .map_err(|_| "Invalid LOCATION_MIN_DISTANCE_M")?;

        if !(location_min_distance_m >= 0.0 && location_min_distance_m.is_finite()) {
            return Err("LOCATION_MIN_DISTANCE_M must be a non-negative distance".to_string());
        }

        Ok(Config {
            route_backend,
            mapbox_api_key,
            mapbox_base_url: env::var("MAPBOX_BASE_URL").ok().filter(|u| !u.is_empty()),
            transport_mode: env::var("TRANSPORT_MODE")
                .unwrap_or_else(|_| TransportMode::default().to_string())
                .parse()?,
            route_cache_ttl: env::var("ROUTE_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_ROUTE_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_CACHE_TTL")?,
            route_cache_max_entries: env::var("ROUTE_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| DEFAULT_ROUTE_CACHE_MAX_ENTRIES.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_CACHE_MAX_ENTRIES")?,
            location_min_distance_m,
            viewport: ViewportConfig::from_env()?,
            overlay_style: overlay_style_from_env()?,
        })
    }
}
