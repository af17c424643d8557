//! Generates a synthetic walk and writes it as GPX, ready for replay.
//!
//! Run with:
//! ```
//! SIM_OUTPUT=walk.gpx cargo run -p test-data --bin simulate
//! ```

use std::str::FromStr;

use test_data::prelude::*;
use tracing_subscriber::EnvFilter;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {key}={value}");
            default
        }),
        Err(_) => default,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let output = std::env::var("SIM_OUTPUT").unwrap_or_else(|_| "walk.gpx".to_string());
    let distance: f64 = env_or("SIM_DISTANCE_M", 2000.0);
    let seed: u64 = env_or("SIM_SEED", 12345); // Reproducible data
    let glitches: f64 = env_or("SIM_GLITCH_PROBABILITY", 0.0);

    let start_millis = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let mut rng = StdRng::seed_from_u64(seed);
    let walk = WalkGenerator::for_region(Region::IBIRAPUERA)
        .with_distance(distance)
        .with_glitches(glitches)
        .generate(&WalkerProfile::default(), start_millis, &mut rng);

    test_data::gpx::write_file(&output, &walk, "Simulated walk")?;

    tracing::info!("Simulation completed!");
    tracing::info!("  Output: {output}");
    tracing::info!("  Readings: {}", walk.positions.len());
    tracing::info!("  Glitches dropped: {}", walk.glitches);
    tracing::info!("  Path length: {:.0} m", walk.path_meters);

    Ok(())
}
