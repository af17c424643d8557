//! The tracking session as a tokio actor.
//!
//! A single task owns the [`TrackingSession`], the duration ticker and the
//! position subscription, so ticks, positions and commands are applied one at
//! a time in the order they become ready. Callers talk to it through a
//! cloneable [`SessionHandle`].

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{Instant, Interval, MissedTickBehavior, interval_at},
};
use tracing::{Span, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    config::{TrackerConfig, WatchPolicy},
    errors::{SourceError, TrackingError},
    finalizer::{self, FinalizeHandle, SessionFinalizer},
    models::{PositionSample, SessionEvent, SessionSnapshot},
    session::{Ending, TrackingSession},
    sources::{PositionEvent, PositionSource, Subscription},
};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { session_id: Uuid },
    /// A session was already running; nothing changed.
    AlreadyActive,
}

#[derive(Debug)]
pub enum StopOutcome {
    /// No session was running; nothing changed.
    AlreadyIdle,
    /// Stopped, but no position was ever accepted.
    NothingRecorded,
    /// Stopped; the activity record is being persisted.
    Finalizing(FinalizeHandle),
}

enum Command {
    Start {
        reply: oneshot::Sender<Result<StartOutcome, TrackingError>>,
    },
    Stop {
        reply: oneshot::Sender<StopOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Route {
        reply: oneshot::Sender<Vec<PositionSample>>,
    },
}

#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Spawns the session actor on the current tokio runtime. The actor
    /// shuts down, releasing any live subscription, once every handle is
    /// dropped.
    pub fn spawn(
        config: &TrackerConfig,
        source: Arc<dyn PositionSource>,
        finalizer: SessionFinalizer,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let actor = SessionActor {
            session: TrackingSession::new(),
            active: None,
            source,
            finalizer,
            policy: config.watch,
            tick_interval: config.tick_interval,
            commands: command_rx,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
            span: Span::none(),
        };
        tokio::spawn(actor.run());

        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx,
        }
    }

    pub async fn start(&self) -> Result<StartOutcome, TrackingError> {
        self.request(|reply| Command::Start { reply }).await?
    }

    pub async fn stop(&self) -> Result<StopOutcome, TrackingError> {
        self.request(|reply| Command::Stop { reply }).await
    }

    /// Snapshot taken by the actor after everything already delivered to it
    /// has been applied.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, TrackingError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn current_route(&self) -> Result<Vec<PositionSample>, TrackingError> {
        self.request(|reply| Command::Route { reply }).await
    }

    /// Live readouts, updated after every change.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, TrackingError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| TrackingError::SessionClosed)?;
        rx.await.map_err(|_| TrackingError::SessionClosed)
    }
}

/// Resources that exist only while a session is active. Dropping them
/// cancels the ticker and the position subscription.
struct ActiveResources {
    subscription: Subscription,
    ticker: Interval,
}

enum Wakeup {
    Tick,
    Position(PositionEvent),
    SourceClosed,
}

impl ActiveResources {
    fn acquire(subscription: Subscription, period: Duration) -> Self {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Self {
            subscription,
            ticker,
        }
    }

    async fn next(&mut self) -> Wakeup {
        tokio::select! {
            biased;
            event = self.subscription.recv() => match event {
                Some(event) => Wakeup::Position(event),
                None => Wakeup::SourceClosed,
            },
            _ = self.ticker.tick() => Wakeup::Tick,
        }
    }

    fn release(self) {
        self.subscription.unsubscribe();
    }
}

async fn next_wakeup(active: &mut Option<ActiveResources>) -> Wakeup {
    match active {
        Some(resources) => resources.next().await,
        None => std::future::pending().await,
    }
}

struct SessionActor {
    session: TrackingSession,
    active: Option<ActiveResources>,
    source: Arc<dyn PositionSource>,
    finalizer: SessionFinalizer,
    policy: WatchPolicy,
    tick_interval: Duration,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    span: Span,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            // Pending positions and ticks go before commands queued behind them.
            tokio::select! {
                biased;
                wakeup = next_wakeup(&mut self.active) => self.on_wakeup(wakeup),
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    None => break,
                },
            }
        }

        if let Some(resources) = self.active.take() {
            resources.release();
        }
        debug!("Session actor shut down");
    }

    async fn on_command(&mut self, command: Command) {
        match command {
            Command::Start { reply } => {
                let _ = reply.send(self.start().await);
            }
            Command::Stop { reply } => {
                let _ = reply.send(self.stop());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Route { reply } => {
                let _ = reply.send(self.session.current_route().to_vec());
            }
        }
    }

    async fn start(&mut self) -> Result<StartOutcome, TrackingError> {
        if self.session.is_active() {
            debug!(parent: &self.span, "Start requested while active, ignoring");
            return Ok(StartOutcome::AlreadyActive);
        }

        let subscription = self.source.subscribe(self.policy).await.map_err(|e| {
            warn!("Position source unavailable: {e}");
            TrackingError::SourceUnavailable(e)
        })?;

        let session_id = Uuid::new_v4();
        self.session.begin(session_id);
        self.active = Some(ActiveResources::acquire(subscription, self.tick_interval));
        self.span = info_span!("tracking_session", %session_id);
        info!(parent: &self.span, "Tracking started");

        self.publish();
        self.emit(SessionEvent::Started { session_id });
        Ok(StartOutcome::Started { session_id })
    }

    fn stop(&mut self) -> StopOutcome {
        let _guard = self.span.clone().entered();

        let Some(resources) = self.active.take() else {
            debug!("Stop requested while idle, ignoring");
            return StopOutcome::AlreadyIdle;
        };
        resources.release();

        let session_id = self.session.session_id().unwrap_or_default();
        match self.session.end() {
            Ending::NotActive => StopOutcome::AlreadyIdle,
            Ending::Empty => {
                info!("Tracking stopped with no accepted positions, nothing recorded");
                self.publish();
                self.emit(SessionEvent::Stopped {
                    session_id,
                    recorded: false,
                });
                StopOutcome::NothingRecorded
            }
            Ending::Completed(done) => {
                info!(
                    distance_km = done.distance_km,
                    duration_seconds = done.duration_seconds,
                    samples = done.route.len(),
                    "Tracking stopped"
                );
                self.publish();
                self.emit(SessionEvent::Stopped {
                    session_id,
                    recorded: true,
                });
                StopOutcome::Finalizing(self.finalizer.finalize(
                    done,
                    finalizer::today(),
                    self.events.clone(),
                ))
            }
        }
    }

    fn on_wakeup(&mut self, wakeup: Wakeup) {
        let _guard = self.span.clone().entered();

        match wakeup {
            Wakeup::Tick => {
                self.session.on_tick();
                self.publish();
            }
            Wakeup::Position(PositionEvent::Sample(raw)) => {
                if self.session.on_position(&raw) {
                    self.publish();
                }
            }
            Wakeup::Position(PositionEvent::Error(error)) => self.interrupt(error),
            Wakeup::SourceClosed => self.interrupt(SourceError::Disconnected),
        }
    }

    /// Stops without finalizing after the source failed.
    fn interrupt(&mut self, error: SourceError) {
        if let Some(resources) = self.active.take() {
            resources.release();
        }
        if !self.session.interrupt(error.clone()) {
            return;
        }

        warn!(
            samples = self.session.current_route().len(),
            "Position source failed, tracking stopped without recording: {error}"
        );
        self.publish();
        self.emit(SessionEvent::Interrupted {
            session_id: self.session.session_id().unwrap_or_default(),
            error,
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{RawPosition, SessionState},
        sources::ChannelSource,
        store::{MemoryActivityStore, MemoryCalorieLedger},
    };

    fn spawn(source: &ChannelSource) -> SessionHandle {
        spawn_with(source, &TrackerConfig::default())
    }

    fn spawn_with(source: &ChannelSource, config: &TrackerConfig) -> SessionHandle {
        let finalizer = SessionFinalizer::new(
            Uuid::new_v4(),
            Arc::new(MemoryActivityStore::new()),
            Arc::new(MemoryCalorieLedger::new()),
        );
        SessionHandle::spawn(config, Arc::new(source.clone()), finalizer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_count_whole_seconds() {
        let source = ChannelSource::new();
        let mut config = TrackerConfig::default();
        config.watch.timeout = Duration::from_secs(60);
        let handle = spawn_with(&source, &config);
        handle.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(handle.snapshot().await.unwrap().elapsed_seconds, 0);

        tokio::time::sleep(Duration::from_millis(4501)).await;
        assert_eq!(handle.snapshot().await.unwrap().elapsed_seconds, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_frozen_after_stop() {
        let source = ChannelSource::new();
        let handle = spawn(&source);
        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(matches!(
            handle.stop().await.unwrap(),
            StopOutcome::NothingRecorded
        ));
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.elapsed_seconds, 2);
    }

    #[tokio::test]
    async fn test_positions_before_command_are_applied() {
        let source = ChannelSource::new();
        let handle = spawn(&source);
        handle.start().await.unwrap();

        for i in 0..20 {
            assert!(source.push(RawPosition::new(0.0, i as f64 * 0.001, i)));
        }

        let route = handle.current_route().await.unwrap();
        assert_eq!(route.len(), 20);
        assert_eq!(route[19].captured_at_millis, 19);
    }

    #[tokio::test]
    async fn test_dropping_handles_releases_subscription() {
        let source = ChannelSource::new();
        let handle = spawn(&source);
        handle.start().await.unwrap();
        assert!(source.has_subscriber());

        drop(handle);
        tokio::time::timeout(Duration::from_secs(1), async {
            while source.has_subscriber() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscription should be released");
    }
}
