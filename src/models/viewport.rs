//! Visible map region and the two policies that produce it.
//!
//! - follow-user: centered on the user with a fixed span (Idle mode)
//! - fit-route: centered on the route extent with a span large enough that
//!   the whole path stays clear of the edge padding (DestinationSelected mode)

use crate::config::ViewportConfig;
use crate::models::geo::BoundingBox;
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MAX_LAT_SPAN_DEG: f64 = 180.0;
const MAX_LNG_SPAN_DEG: f64 = 360.0;

/// Angular extent of a viewport, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub lat_delta: f64,
    pub lng_delta: f64,
}

impl Span {
    pub fn uniform(delta: f64) -> Self {
        Span {
            lat_delta: delta,
            lng_delta: delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub span: Span,
}

impl Viewport {
    pub fn follow_user(user: Coordinates, config: &ViewportConfig) -> Self {
        Viewport {
            center: user,
            span: Span::uniform(config.follow_user_span_deg),
        }
    }

    pub fn fit_route(extent: &BoundingBox, config: &ViewportConfig) -> Self {
        let padding = &config.edge_padding;
        let inner_width = (config.view_width_pt - padding.horizontal()).max(1.0);
        let inner_height = (config.view_height_pt - padding.vertical()).max(1.0);

        // The extent must fill at most the unpadded inner area, so the span
        // covering the full view grows by view/inner along each axis.
        let lat_delta = (extent.lat_span() * config.view_height_pt / inner_height)
            .max(config.min_route_span_deg)
            .min(MAX_LAT_SPAN_DEG);
        let lng_delta = (extent.lng_span() * config.view_width_pt / inner_width)
            .max(config.min_route_span_deg)
            .min(MAX_LNG_SPAN_DEG);

        Viewport {
            center: extent.center(),
            span: Span {
                lat_delta,
                lng_delta,
            },
        }
    }

    pub fn contains(&self, coord: &Coordinates) -> bool {
        (coord.lat - self.center.lat).abs() <= self.span.lat_delta / 2.0
            && (coord.lng - self.center.lng).abs() <= self.span.lng_delta / 2.0
    }
}

/// Insets, in device-independent points, that the fitted route must stay clear of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePadding {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgePadding {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        EdgePadding {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Parses `top,left,bottom,right`.
impl FromStr for EdgePadding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| format!("Invalid edge padding: '{}'", s))?;

        match values.as_slice() {
            [top, left, bottom, right] => {
                if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(format!("Edge padding must be non-negative: '{}'", s));
                }
                Ok(EdgePadding::new(*top, *left, *bottom, *right))
            }
            _ => Err(format!(
                "Edge padding needs 4 values (top,left,bottom,right): '{}'",
                s
            )),
        }
    }
}
