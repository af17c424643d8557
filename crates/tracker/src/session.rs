//! The tracking state machine, free of any I/O.
//!
//! [`TrackingSession`] owns the route, running distance and elapsed clock of
//! one start-to-stop episode. It is driven by the actor in
//! [`crate::runtime`], which owns the timer and the position subscription.

use uuid::Uuid;

use crate::{
    errors::SourceError,
    models::{PositionSample, RawPosition, SessionSnapshot, SessionState},
    route::RouteAccumulator,
    sample_filter,
};

/// Everything the finalizer needs from a session that stopped normally with
/// at least one accepted sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    pub session_id: Uuid,
    pub route: Vec<PositionSample>,
    pub distance_km: f64,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ending {
    /// The session was not active; nothing changed.
    NotActive,
    /// Stopped without any accepted sample.
    Empty,
    Completed(CompletedSession),
}

#[derive(Debug, Default)]
pub struct TrackingSession {
    state: SessionState,
    session_id: Option<Uuid>,
    route: RouteAccumulator,
    elapsed_seconds: u64,
    last_error: Option<SourceError>,
}

impl TrackingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Idle -> Active with a clean route and clock. Returns false, changing
    /// nothing, when already active.
    pub fn begin(&mut self, session_id: Uuid) -> bool {
        if self.is_active() {
            return false;
        }

        self.route.reset();
        self.elapsed_seconds = 0;
        self.last_error = None;
        self.session_id = Some(session_id);
        self.state = SessionState::Active;
        true
    }

    pub fn on_tick(&mut self) {
        if self.is_active() {
            self.elapsed_seconds += 1;
        }
    }

    /// Filters a raw reading and appends it to the route when valid.
    /// Returns whether it was accepted.
    pub fn on_position(&mut self, raw: &RawPosition) -> bool {
        if !self.is_active() {
            return false;
        }

        match sample_filter::accept(raw) {
            Ok(sample) => {
                self.route.add(sample);
                tracing::debug!(
                    latitude = sample.latitude,
                    longitude = sample.longitude,
                    distance_km = self.route.current_distance_km(),
                    "Accepted position"
                );
                true
            }
            Err(reason) => {
                tracing::trace!(%reason, ?raw, "Dropped position");
                false
            }
        }
    }

    /// Active -> Idle without producing anything, for a failed source.
    /// Returns whether the session was active.
    pub fn interrupt(&mut self, error: SourceError) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = SessionState::Idle;
        self.last_error = Some(error);
        true
    }

    /// Active -> Idle for a normal stop. The readouts stay frozen at their
    /// final values until the next [`TrackingSession::begin`].
    pub fn end(&mut self) -> Ending {
        if !self.is_active() {
            return Ending::NotActive;
        }
        self.state = SessionState::Idle;

        if self.route.is_empty() {
            return Ending::Empty;
        }

        Ending::Completed(CompletedSession {
            session_id: self.session_id.unwrap_or_default(),
            route: self.route.current_route().to_vec(),
            distance_km: self.route.current_distance_km(),
            duration_seconds: self.elapsed_seconds,
        })
    }

    pub fn current_distance_km(&self) -> f64 {
        self.route.current_distance_km()
    }

    pub fn current_route(&self) -> &[PositionSample] {
        self.route.current_route()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            state: self.state,
            distance_km: self.route.current_distance_km(),
            elapsed_seconds: self.elapsed_seconds,
            samples: self.route.len(),
            last_error: self.last_error.clone(),
        }
    }
}
