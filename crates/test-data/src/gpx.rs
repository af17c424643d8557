//! GPX export of generated walks.

use std::path::Path;

use anyhow::Context as _;
use tracker::{gpx_processor::GpxProcessor, models::PositionSample, sample_filter};

use crate::sources::GeneratedWalk;

/// Keeps the readings the tracker would accept, in order.
pub fn accepted_route(walk: &GeneratedWalk) -> Vec<PositionSample> {
    walk.positions
        .iter()
        .filter_map(|raw| sample_filter::accept(raw).ok())
        .collect()
}

/// Serializes the usable part of `walk` as a GPX 1.1 track.
pub fn generate_gpx(walk: &GeneratedWalk, activity_name: &str) -> anyhow::Result<Vec<u8>> {
    let route = accepted_route(walk);
    GpxProcessor::write_route(&route, activity_name).context("Failed to serialize walk as GPX")
}

pub fn write_file(path: impl AsRef<Path>, walk: &GeneratedWalk, activity_name: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    let bytes = generate_gpx(walk, activity_name)?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{profiles::WalkerProfile, sources::WalkGenerator};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_gpx_keeps_only_accepted_points() {
        let mut rng = StdRng::seed_from_u64(11);
        let walk = WalkGenerator::new()
            .with_distance(300.0)
            .with_glitches(0.2)
            .generate(&WalkerProfile::default(), 1_700_000_000_000, &mut rng);

        let gpx = generate_gpx(&walk, "Morning walk").unwrap();
        let points = GpxProcessor::read_bytes(&gpx).unwrap();

        assert_eq!(points.len(), walk.valid_count());
        assert!(points.iter().all(|p| p.time.is_some()));
        assert!(String::from_utf8(gpx).unwrap().contains("Morning walk"));
    }
}
