use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::errors::{SourceError, StoreError};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.longitude, c.latitude)
    }
}

/// A reading exactly as delivered by a position source. Any field may be
/// missing or garbage; only the sample filter turns it into a
/// [`PositionSample`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPosition {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_at_millis: i64,
}

impl RawPosition {
    pub fn new(latitude: f64, longitude: f64, captured_at_millis: i64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            captured_at_millis,
        }
    }
}

/// An accepted, range-valid position with its capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "timestamp")]
    pub captured_at_millis: i64,
}

impl PositionSample {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Walk,
}

/// The immutable summary of one completed tracking session, handed to the
/// persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(rename = "distance")]
    pub distance_km: f64,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    pub calories_burned: u32,
    pub route: Vec<PositionSample>,
    pub date: Date,
}

/// An activity record together with the identifier the store assigned it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedActivity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record: ActivityRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Active,
}

/// Live readout of a session, published after every change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionSnapshot {
    /// Id of the current (or most recently stopped) session.
    pub session_id: Option<Uuid>,
    pub state: SessionState,
    pub distance_km: f64,
    pub elapsed_seconds: u64,
    pub samples: usize,
    /// Why the last session stopped on its own, cleared by the next start.
    pub last_error: Option<SourceError>,
}

/// Lifecycle notifications broadcast by a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { session_id: Uuid },
    Stopped { session_id: Uuid, recorded: bool },
    /// The position source failed mid-session; the session stopped without
    /// recording anything.
    Interrupted { session_id: Uuid, error: SourceError },
    Saved(SavedActivity),
    SaveFailed { session_id: Uuid, error: StoreError },
}
