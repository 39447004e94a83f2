//! Scripted input for the coordinator: one JSON object per line.
//!
//! ```text
//! {"type": "location", "lat": 48.8566, "lng": 2.3522}
//! {"type": "select", "lat": 48.8584, "lng": 2.2945, "label": "Eiffel Tower"}
//! {"type": "wait", "ms": 250}
//! {"type": "clear"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::coordinator::CoordinatorHandle;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::LocationTracker;
use serde::Deserialize;
use std::io::BufRead;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Location {
        lat: f64,
        lng: f64,
    },
    Select {
        lat: f64,
        lng: f64,
        #[serde(default)]
        label: String,
    },
    Clear,
    Wait {
        ms: u64,
    },
}

pub fn parse_script(reader: impl BufRead) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event = serde_json::from_str(trimmed).map_err(|e| {
            AppError::InvalidRequest(format!("script line {}: {}", index + 1, e))
        })?;
        events.push(event);
    }

    Ok(events)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub locations_accepted: usize,
    pub locations_filtered: usize,
    pub selections: usize,
    pub clears: usize,
    /// When the last forwarded fix was recorded
    pub last_fix_at: Option<OffsetDateTime>,
}

/// Feed `events` to the coordinator in order. Location reports pass through
/// `tracker` first and only accepted fixes are forwarded.
pub async fn replay(
    events: &[ScriptEvent],
    tracker: &LocationTracker,
    handle: &CoordinatorHandle,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for event in events {
        match event {
            ScriptEvent::Location { lat, lng } => match tracker.record(*lat, *lng)? {
                Some(fix) => {
                    if let Some(previous) = summary.last_fix_at {
                        let gap = fix.recorded_at - previous;
                        tracing::debug!(
                            gap_ms = gap.whole_milliseconds() as i64,
                            "Forwarding fix ({:.5}, {:.5}), {}ms after the previous one",
                            fix.coordinates.lat,
                            fix.coordinates.lng,
                            gap.whole_milliseconds()
                        );
                    }
                    handle.location_updated(fix.coordinates)?;
                    summary.locations_accepted += 1;
                    summary.last_fix_at = Some(fix.recorded_at);
                }
                None => summary.locations_filtered += 1,
            },
            ScriptEvent::Select { lat, lng, label } => {
                let coordinates = Coordinates::new(*lat, *lng).map_err(AppError::InvalidRequest)?;
                handle.destination_selected(coordinates, label.clone())?;
                summary.selections += 1;
            }
            ScriptEvent::Clear => {
                handle.destination_cleared()?;
                summary.clears += 1;
            }
            ScriptEvent::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
        }
    }

    tracing::debug!(
        accepted = summary.locations_accepted,
        filtered = summary.locations_filtered,
        "Replayed {} script event(s)",
        events.len()
    );

    Ok(summary)
}
