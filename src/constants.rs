//! Stable application-wide constants.
//!
//! Values here are presentation defaults and fallbacks for env-var-based
//! configuration. For the knobs that are read at startup, see
//! [`Config`](crate::config::Config) and
//! [`ViewportConfig`](crate::config::ViewportConfig).

// --- Viewport policies ---

/// Follow-user span in degrees per axis (street-level context).
/// Overridden by `MAP_FOLLOW_USER_SPAN_DEG`.
pub const DEFAULT_FOLLOW_USER_SPAN_DEG: f64 = 0.05;
/// Smallest span the fit-route policy may produce, per axis.
/// Keeps very short routes from zooming in past street level.
/// Overridden by `MAP_MIN_ROUTE_SPAN_DEG`.
pub const DEFAULT_MIN_ROUTE_SPAN_DEG: f64 = 0.005;

// --- Fit-route edge padding (device-independent points) ---
// The bottom inset clears the destination sheet that covers the lower part
// of the map while a destination is selected.

pub const DEFAULT_EDGE_PADDING_TOP: f64 = 64.0;
pub const DEFAULT_EDGE_PADDING_LEFT: f64 = 32.0;
pub const DEFAULT_EDGE_PADDING_BOTTOM: f64 = 500.0;
pub const DEFAULT_EDGE_PADDING_RIGHT: f64 = 32.0;

// --- Map view size (device-independent points) ---

pub const DEFAULT_VIEW_WIDTH_PT: f64 = 390.0;
pub const DEFAULT_VIEW_HEIGHT_PT: f64 = 844.0;

// --- Presentation ---

/// Annotation title used when a destination arrives with a blank label.
pub const DEFAULT_ANNOTATION_TITLE: &str = "Destination";
/// Route overlay stroke color (system blue).
pub const DEFAULT_OVERLAY_STROKE_COLOR: &str = "#007AFF";
/// Route overlay stroke width in points.
pub const DEFAULT_OVERLAY_LINE_WIDTH: f64 = 6.0;

// --- Location tracking ---

/// Fixes closer than this to the last accepted fix are dropped.
/// Overridden by `LOCATION_MIN_DISTANCE_M`.
pub const DEFAULT_LOCATION_MIN_DISTANCE_M: f64 = 5.0;

// --- Route cache ---

/// Route cache TTL: 5 minutes. Overridden by `ROUTE_CACHE_TTL`.
pub const DEFAULT_ROUTE_CACHE_TTL_SECONDS: u64 = 300;
/// Route cache capacity. Overridden by `ROUTE_CACHE_MAX_ENTRIES`.
pub const DEFAULT_ROUTE_CACHE_MAX_ENTRIES: u64 = 256;
/// Decimal places endpoints are rounded to when building cache keys (~11 m).
pub const ROUTE_CACHE_COORDINATE_PRECISION: u32 = 4;

// --- Straight-line backend ---

/// Number of segments the straight-line polyline is split into.
pub const STRAIGHT_LINE_SEGMENTS: usize = 16;
