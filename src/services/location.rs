use crate::error::{AppError, Result};
use crate::models::Coordinates;
use time::OffsetDateTime;
use tokio::sync::watch;

/// One accepted position report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coordinates: Coordinates,
    pub recorded_at: OffsetDateTime,
}

/// Source of the current user coordinate.
///
/// The first fix is always accepted. Later fixes closer than
/// `min_distance_m` to the last accepted one are dropped, so jitter from a
/// stationary device does not reach the coordinator. Accepted fixes are
/// published on a watch channel.
pub struct LocationTracker {
    min_distance_m: f64,
    sender: watch::Sender<Option<LocationFix>>,
}

impl LocationTracker {
    pub fn new(min_distance_m: f64) -> Self {
        let (sender, _) = watch::channel(None);
        LocationTracker {
            min_distance_m: min_distance_m.max(0.0),
            sender,
        }
    }

    /// Record a raw position report. Returns the fix if it was accepted.
    pub fn record(&self, lat: f64, lng: f64) -> Result<Option<LocationFix>> {
        let coordinates = Coordinates::new(lat, lng).map_err(AppError::InvalidRequest)?;
        Ok(self.record_coordinates(coordinates))
    }

    pub fn record_coordinates(&self, coordinates: Coordinates) -> Option<LocationFix> {
        let mut accepted = None;

        self.sender.send_if_modified(|current| {
            if let Some(previous) = current {
                let moved_m = previous.coordinates.distance_to(&coordinates) * 1000.0;
                if moved_m < self.min_distance_m {
                    tracing::debug!(
                        moved_m = %format!("{:.1}", moved_m),
                        "Location fix within {}m of previous, ignoring",
                        self.min_distance_m
                    );
                    return false;
                }
            }

            let fix = LocationFix {
                coordinates,
                recorded_at: OffsetDateTime::now_utc(),
            };
            *current = Some(fix);
            accepted = Some(fix);
            true
        });

        accepted
    }

    pub fn latest(&self) -> Option<LocationFix> {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LocationFix>> {
        self.sender.subscribe()
    }
}
