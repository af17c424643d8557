use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Notify, mpsc};

use super::{PositionEvent, PositionSource, SUBSCRIPTION_BUFFER, Subscription};
use crate::{
    config::WatchPolicy,
    errors::{GpxError, SourceError},
    gpx_processor::{GpxProcessor, TrackPoint},
    models::RawPosition,
};

/// Gap assumed between points that carry no timestamp.
const UNTIMED_GAP: Duration = Duration::from_secs(1);

/// Replays a recorded track as if it were a live receiver.
///
/// Points are delivered with the gaps recorded in the track divided by
/// `speedup`, and stamped with the wall-clock time of delivery. A gap longer
/// than the policy timeout is reported as [`SourceError::Timeout`].
#[derive(Debug, Clone)]
pub struct GpxReplaySource {
    points: Arc<Vec<TrackPoint>>,
    speedup: f64,
    exhausted: Arc<Notify>,
}

impl GpxReplaySource {
    /// A `speedup` that is not a positive finite number replays in real time.
    pub fn new(points: Vec<TrackPoint>, speedup: f64) -> Self {
        let speedup = if speedup.is_finite() && speedup > 0.0 {
            speedup
        } else {
            tracing::warn!(speedup, "Invalid replay speed-up, replaying in real time");
            1.0
        };

        Self {
            points: Arc::new(points),
            speedup,
            exhausted: Arc::new(Notify::new()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>, speedup: f64) -> Result<Self, GpxError> {
        Ok(Self::new(GpxProcessor::read_file(path)?, speedup))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Resolves once a replay has delivered its last point.
    pub async fn exhausted(&self) {
        self.exhausted.notified().await;
    }

    fn gap(&self, prev: &TrackPoint, next: &TrackPoint) -> Duration {
        let recorded = match (prev.time, next.time) {
            (Some(t1), Some(t2)) => Duration::from_secs_f64((t2 - t1).as_seconds_f64().max(0.0)),
            _ => UNTIMED_GAP,
        };
        recorded.div_f64(self.speedup)
    }

    async fn replay(self, tx: mpsc::Sender<PositionEvent>, policy: WatchPolicy) {
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                let gap = self.gap(&self.points[i - 1], point);
                if gap > policy.timeout {
                    tracing::debug!(?gap, "Replay gap exceeds position timeout");
                    let _ = tx.send(PositionEvent::Error(SourceError::Timeout)).await;
                    return;
                }

                tokio::select! {
                    _ = tx.closed() => return,
                    _ = tokio::time::sleep(gap) => {}
                }
            }

            let raw = RawPosition::new(
                point.coordinate.latitude,
                point.coordinate.longitude,
                now_millis(),
            );
            if tx.send(PositionEvent::Sample(raw)).await.is_err() {
                return;
            }
        }

        tracing::debug!(points = self.points.len(), "Replay exhausted");
        self.exhausted.notify_one();
        tx.closed().await;
    }
}

#[async_trait]
impl PositionSource for GpxReplaySource {
    async fn subscribe(&self, policy: WatchPolicy) -> Result<Subscription, SourceError> {
        if self.points.is_empty() {
            return Err(SourceError::PositionUnavailable);
        }

        let (tx, subscription) = Subscription::channel(SUBSCRIPTION_BUFFER);
        tokio::spawn(self.clone().replay(tx, policy));
        Ok(subscription)
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
