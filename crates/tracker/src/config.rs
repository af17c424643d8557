//! Engine configuration.

use std::{env, path::PathBuf, time::Duration};

use uuid::Uuid;

/// Subscription policy requested from a position source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchPolicy {
    pub high_accuracy: bool,
    /// Longest wait for the next position before the source reports a timeout.
    pub timeout: Duration,
    /// Oldest cached position the source may hand out. Zero means every
    /// sample must be a fresh fix.
    pub maximum_age: Duration,
}

impl Default for WatchPolicy {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(5000),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// User the finished activities are saved for.
    pub user_id: Uuid,
    pub watch: WatchPolicy,
    /// Period of the elapsed-duration clock.
    pub tick_interval: Duration,
    /// GPX track replayed by the `tracker` binary.
    pub gpx_path: Option<PathBuf>,
    /// Replay time compression; 2.0 replays twice as fast as recorded.
    pub replay_speedup: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            watch: WatchPolicy::default(),
            tick_interval: Duration::from_secs(1),
            gpx_path: None,
            replay_speedup: 1.0,
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let user_id = match env::var("TRACKER_USER_ID") {
            Ok(raw) => raw.parse::<Uuid>().unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid TRACKER_USER_ID {raw:?}: {e}");
                defaults.user_id
            }),
            Err(_) => defaults.user_id,
        };

        let gpx_path = env::var("TRACKER_GPX_PATH").ok().map(PathBuf::from);

        let replay_speedup = env::var("TRACKER_REPLAY_SPEEDUP")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(defaults.replay_speedup);

        Self {
            user_id,
            gpx_path,
            replay_speedup,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_watch_policy() {
        let policy = WatchPolicy::default();
        assert!(policy.high_accuracy);
        assert_eq!(policy.timeout, Duration::from_millis(5000));
        assert_eq!(policy.maximum_age, Duration::ZERO);
    }

    #[test]
    fn test_default_tick_is_one_second() {
        assert_eq!(TrackerConfig::default().tick_interval, Duration::from_secs(1));
    }
}
