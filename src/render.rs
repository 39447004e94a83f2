//! Outbound presentation commands and the renderers that consume them.

use crate::constants::{DEFAULT_OVERLAY_LINE_WIDTH, DEFAULT_OVERLAY_STROKE_COLOR};
use crate::error::Result;
use crate::models::{Coordinates, Viewport};
use serde::Serialize;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayStyle {
    pub stroke_color: String,
    pub line_width: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle {
            stroke_color: DEFAULT_OVERLAY_STROKE_COLOR.to_string(),
            line_width: DEFAULT_OVERLAY_LINE_WIDTH,
        }
    }
}

/// Desired presentation, not a delta: applying the same command twice leaves
/// the map as applying it once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    SetViewport(Viewport),
    ShowAnnotation {
        coordinates: Coordinates,
        title: String,
    },
    HideAllAnnotations,
    ShowRouteOverlay {
        polyline: Vec<Coordinates>,
        style: OverlayStyle,
    },
    HideRouteOverlay,
}

/// The map view collaborator.
pub trait MapRenderer: Send {
    fn render(&mut self, command: &RenderCommand);
}

/// Keeps every command in order. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    commands: Arc<Mutex<Vec<RenderCommand>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<RenderCommand> {
        self.commands
            .lock()
            .map(|mut commands| std::mem::take(&mut *commands))
            .unwrap_or_default()
    }
}

impl MapRenderer for RecordingRenderer {
    fn render(&mut self, command: &RenderCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.clone());
        }
    }
}

/// Writes one JSON object per command. Route overlays are emitted as GeoJSON
/// LineString geometries.
pub struct JsonLinesRenderer<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        JsonLinesRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn to_json(command: &RenderCommand) -> Result<serde_json::Value> {
        let value = match command {
            RenderCommand::ShowRouteOverlay { polyline, style } => {
                let line = polyline
                    .iter()
                    .map(|c| vec![c.lng, c.lat])
                    .collect::<Vec<_>>();
                let geometry = geojson::Geometry::new(geojson::Value::LineString(line));
                serde_json::json!({
                    "command": "show_route_overlay",
                    "geometry": serde_json::to_value(&geometry)?,
                    "style": style,
                })
            }
            other => serde_json::to_value(other)?,
        };
        Ok(value)
    }

    fn write_command(&mut self, command: &RenderCommand) -> Result<()> {
        let value = Self::to_json(command)?;
        writeln!(self.out, "{}", value)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> MapRenderer for JsonLinesRenderer<W> {
    fn render(&mut self, command: &RenderCommand) {
        if let Err(e) = self.write_command(command) {
            tracing::warn!("Failed to write render command: {}", e);
        }
    }
}
