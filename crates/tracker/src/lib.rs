pub mod config;
pub mod errors;
pub mod finalizer;
pub mod geodesy;
pub mod gpx_processor;
pub mod models;
pub mod route;
pub mod runtime;
pub mod sample_filter;
pub mod session;
pub mod sources;
pub mod store;
pub mod summary;

use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    config::TrackerConfig,
    errors::TrackingError,
    finalizer::{SessionFinalizer, today},
    models::{SavedActivity, SessionEvent},
    runtime::{SessionHandle, StopOutcome},
    sources::GpxReplaySource,
    store::{MemoryActivityStore, MemoryCalorieLedger},
    summary::ActivitySummary,
};

/// Replays the configured GPX file through a live session and returns the
/// saved walk, if anything was recorded.
pub async fn run_replay(config: TrackerConfig) -> anyhow::Result<Option<SavedActivity>> {
    let path = config
        .gpx_path
        .clone()
        .context("TRACKER_GPX_PATH must point at a GPX file to replay")?;
    let source = GpxReplaySource::from_file(&path, config.replay_speedup)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    tracing::info!(
        "Replaying {} points from {} at {}x",
        source.len(),
        path.display(),
        config.replay_speedup
    );

    let store = Arc::new(MemoryActivityStore::new());
    let ledger = Arc::new(MemoryCalorieLedger::new());
    let finalizer = SessionFinalizer::new(config.user_id, store.clone(), ledger.clone());
    let handle = SessionHandle::spawn(&config, Arc::new(source.clone()), finalizer);
    let mut events = handle.events();

    handle.start().await?;

    loop {
        tokio::select! {
            _ = source.exhausted() => break,
            event = events.recv() => match event {
                Ok(SessionEvent::Interrupted { error, .. }) => {
                    return Err(TrackingError::SourceInterrupted(error)).context("Replay interrupted");
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    let saved = match handle.stop().await? {
        StopOutcome::Finalizing(pending) => Some(pending.outcome().await?),
        StopOutcome::NothingRecorded | StopOutcome::AlreadyIdle => None,
    };

    if let Some(saved) = &saved {
        tracing::info!("{}", ActivitySummary::new(&saved.record));
        tracing::info!("Calories burned today: {}", ledger.burned_on(today()));
    }

    Ok(saved)
}
