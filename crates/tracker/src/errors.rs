use serde::Serialize;
use thiserror::Error;

/// Failure reported by a position source, either when subscribing or
/// while a subscription is live.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceError {
    #[error("permission to read the device position was denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out waiting for a position")]
    Timeout,

    #[error("position source disconnected")]
    Disconnected,

    #[error("position source error: {0}")]
    Other(String),
}

/// Failure reported by the persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("activity store unavailable")]
    Unavailable,

    #[error("activity rejected by store: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Position source unavailable: {0}")]
    SourceUnavailable(SourceError),

    #[error("Position source interrupted: {0}")]
    SourceInterrupted(SourceError),

    #[error("Failed to persist activity: {0}")]
    PersistenceFailure(#[from] StoreError),

    #[error("Tracking session has shut down")]
    SessionClosed,

    #[error("Finalization task aborted")]
    FinalizeAborted,
}

#[derive(Error, Debug)]
pub enum GpxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPX parse error: {0}")]
    Parse(#[from] gpx::errors::GpxError),

    #[error("No track points found in GPX file")]
    NoPoints,

    #[error("Failed to write GPX: {0}")]
    Write(String),
}
