//! Position sources the tracking session can subscribe to.
//!
//! - [`ChannelSource`]: positions pushed in by the embedding host
//! - [`GpxReplaySource`]: replays a recorded GPX track in real time

mod channel;
mod gpx_replay;

pub use channel::ChannelSource;
pub use gpx_replay::GpxReplaySource;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    config::WatchPolicy,
    errors::SourceError,
    models::RawPosition,
};

/// Buffer between a source and the session consuming it.
pub const SUBSCRIPTION_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    Sample(RawPosition),
    Error(SourceError),
}

/// A device or service that pushes position readings.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Starts delivering positions under `policy`. Fails when the source
    /// cannot be acquired at all (no hardware, permission denied).
    async fn subscribe(&self, policy: WatchPolicy) -> Result<Subscription, SourceError>;
}

/// The receiving end of a live position subscription.
///
/// Dropping it, or calling [`Subscription::unsubscribe`], releases the
/// subscription; sources observe this through `Sender::closed`.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<PositionEvent>,
}

impl Subscription {
    pub fn channel(buffer: usize) -> (mpsc::Sender<PositionEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { events: rx })
    }

    /// Next event, or `None` once the source has gone away.
    pub async fn recv(&mut self) -> Option<PositionEvent> {
        self.events.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.events.close();
    }
}
