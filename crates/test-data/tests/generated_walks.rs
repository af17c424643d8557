//! Feeds generated walks through a live tracking session.

use std::{sync::Arc, time::Duration};

use test_data::{gpx::accepted_route, prelude::*};
use tracker::{
    config::TrackerConfig,
    finalizer::{SessionFinalizer, calories_for, today},
    runtime::{SessionHandle, StopOutcome},
    sources::ChannelSource,
    store::{MemoryActivityStore, MemoryCalorieLedger},
};

struct Setup {
    source: ChannelSource,
    ledger: Arc<MemoryCalorieLedger>,
    handle: SessionHandle,
}

fn setup() -> Setup {
    let source = ChannelSource::new();
    let ledger = Arc::new(MemoryCalorieLedger::new());
    let finalizer = SessionFinalizer::new(
        Default::default(),
        Arc::new(MemoryActivityStore::new()),
        ledger.clone(),
    );
    let handle = SessionHandle::spawn(&TrackerConfig::default(), Arc::new(source.clone()), finalizer);
    Setup {
        source,
        ledger,
        handle,
    }
}

#[tokio::test(start_paused = true)]
async fn test_glitchy_walk_records_only_valid_readings() {
    let mut rng = StdRng::seed_from_u64(2024);
    let walk = WalkGenerator::for_region(Region::CENTRAL_PARK)
        .with_distance(400.0)
        .with_glitches(0.05)
        .generate(&WalkerProfile::default(), 0, &mut rng);
    assert!(walk.glitches > 0);

    let s = setup();
    s.handle.start().await.unwrap();
    for raw in &walk.positions {
        s.source.push(*raw);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let route = s.handle.current_route().await.unwrap();
    let expected = accepted_route(&walk);
    assert_eq!(route, expected);

    let StopOutcome::Finalizing(pending) = s.handle.stop().await.unwrap() else {
        panic!("expected the walk to be recorded");
    };
    let saved = pending.outcome().await.unwrap();

    let recomputed = expected
        .windows(2)
        .map(|w| tracker::geodesy::distance_km(w[0].coordinate(), w[1].coordinate()))
        .fold(0.0, |acc, leg| acc + leg);
    assert_eq!(saved.record.distance_km, recomputed);
    assert_eq!(saved.record.calories_burned, calories_for(recomputed));
    assert_eq!(s.ledger.burned_on(today()), saved.record.calories_burned);
}

#[tokio::test(start_paused = true)]
async fn test_duration_tracks_wall_clock_not_readings() {
    let walk = sample_walk(7);
    let s = setup();
    s.handle.start().await.unwrap();

    // Deliver a whole walk in one burst, then idle.
    for raw in walk.positions.iter().take(50) {
        s.source.push(*raw);
    }
    tokio::time::sleep(Duration::from_millis(4200)).await;

    let snapshot = s.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.samples, 50);
    assert_eq!(snapshot.elapsed_seconds, 4);
}
