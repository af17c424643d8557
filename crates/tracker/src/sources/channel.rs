use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::{
    Notify,
    mpsc::{self, error::TrySendError},
};

use super::{PositionEvent, PositionSource, SUBSCRIPTION_BUFFER, Subscription};
use crate::{config::WatchPolicy, errors::SourceError, models::RawPosition};

/// A source fed by the embedding host, e.g. a platform location callback
/// bridged into the engine. Clones share the same underlying source.
///
/// The policy timeout is enforced here: a subscription that goes that long
/// without a pushed reading receives [`SourceError::Timeout`]. Freshness
/// (`maximum_age`) is up to the host, which owns the readings.
#[derive(Clone, Debug)]
pub struct ChannelSource {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    available: bool,
    sender: Option<mpsc::Sender<PositionEvent>>,
    /// Signalled on every delivered reading to re-arm the timeout.
    activity: Arc<Notify>,
    subscriptions: usize,
}

impl ChannelSource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                available: true,
                sender: None,
                activity: Arc::new(Notify::new()),
                subscriptions: 0,
            })),
        }
    }

    /// A source whose subscriptions are refused, as when the platform
    /// denies location access.
    pub fn unavailable() -> Self {
        let source = Self::new();
        source.set_available(false);
        source
    }

    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Delivers a reading to the live subscriber. Returns false when nobody
    /// is subscribed or the subscriber is not keeping up.
    pub fn push(&self, raw: RawPosition) -> bool {
        self.send(PositionEvent::Sample(raw))
    }

    /// Reports a failure to the live subscriber.
    pub fn fail(&self, error: SourceError) -> bool {
        self.send(PositionEvent::Error(error))
    }

    pub fn has_subscriber(&self) -> bool {
        self.lock()
            .sender
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Number of subscriptions handed out so far.
    pub fn subscription_count(&self) -> usize {
        self.lock().subscriptions
    }

    fn send(&self, event: PositionEvent) -> bool {
        let mut inner = self.lock();
        let Some(tx) = inner.sender.as_ref() else {
            return false;
        };

        match tx.try_send(event) {
            Ok(()) => {
                inner.activity.notify_one();
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Position subscriber is lagging, dropping event");
                false
            }
            Err(TrySendError::Closed(_)) => {
                inner.sender = None;
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChannelSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionSource for ChannelSource {
    async fn subscribe(&self, policy: WatchPolicy) -> Result<Subscription, SourceError> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(SourceError::PermissionDenied);
        }

        tracing::debug!(
            high_accuracy = policy.high_accuracy,
            timeout_ms = policy.timeout.as_millis() as u64,
            "Channel source subscribed"
        );

        let (tx, subscription) = Subscription::channel(SUBSCRIPTION_BUFFER);
        let activity = Arc::new(Notify::new());
        if !policy.timeout.is_zero() {
            tokio::spawn(watchdog(tx.clone(), activity.clone(), policy.timeout));
        }

        inner.sender = Some(tx);
        inner.activity = activity;
        inner.subscriptions += 1;
        Ok(subscription)
    }
}

/// Reports a timeout once `timeout` passes without a delivered reading.
async fn watchdog(tx: mpsc::Sender<PositionEvent>, activity: Arc<Notify>, timeout: Duration) {
    loop {
        tokio::select! {
            _ = tx.closed() => return,
            _ = activity.notified() => {}
            _ = tokio::time::sleep(timeout) => {
                tracing::debug!(?timeout, "No position pushed in time");
                let _ = tx.send(PositionEvent::Error(SourceError::Timeout)).await;
                return;
            }
        }
    }
}
