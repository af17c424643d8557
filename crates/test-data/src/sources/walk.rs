//! Procedural walk generation.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracker::{
    geodesy,
    models::{Coordinate, RawPosition},
};

use crate::config::{BoundingBox, Region, WalkConfig};
use crate::profiles::{self, AthleteProfile};

/// Kinds of unusable readings a real receiver sometimes produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glitch {
    MissingCoordinate,
    NonFinite,
    LatitudeOutOfRange,
    LongitudeOutOfRange,
}

impl Glitch {
    const ALL: [Glitch; 4] = [
        Glitch::MissingCoordinate,
        Glitch::NonFinite,
        Glitch::LatitudeOutOfRange,
        Glitch::LongitudeOutOfRange,
    ];

    fn corrupt(self, mut raw: RawPosition, rng: &mut impl Rng) -> RawPosition {
        match self {
            Glitch::MissingCoordinate => {
                if rng.gen_bool(0.5) {
                    raw.latitude = None;
                } else {
                    raw.longitude = None;
                }
            }
            Glitch::NonFinite => raw.latitude = Some(f64::NAN),
            Glitch::LatitudeOutOfRange => raw.latitude = Some(rng.gen_range(90.5..180.0)),
            Glitch::LongitudeOutOfRange => raw.longitude = Some(-rng.gen_range(180.5..360.0)),
        }
        raw
    }
}

/// A generated walk: the readings a receiver would report, in order.
#[derive(Debug, Clone)]
pub struct GeneratedWalk {
    pub positions: Vec<RawPosition>,
    /// How many of `positions` were deliberately corrupted.
    pub glitches: usize,
    /// Length of the underlying path before jitter, in meters.
    pub path_meters: f64,
}

impl GeneratedWalk {
    pub fn valid_count(&self) -> usize {
        self.positions.len() - self.glitches
    }
}

/// Generates synthetic walks with realistic characteristics.
pub struct WalkGenerator {
    config: WalkConfig,
}

impl Default for WalkGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkGenerator {
    /// Creates a new walk generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: WalkConfig::default(),
        }
    }

    /// Creates a generator for a specific region.
    pub fn for_region(bounds: BoundingBox) -> Self {
        Self {
            config: WalkConfig {
                bounds,
                ..Default::default()
            },
        }
    }

    /// Sets the target distance.
    pub fn with_distance(mut self, meters: f64) -> Self {
        self.config.distance_meters = meters;
        self
    }

    /// Sets the starting point.
    pub fn with_start(mut self, lat: f64, lon: f64) -> Self {
        self.config.start_point = Some((lat, lon));
        self
    }

    /// Sets GPS jitter amount.
    pub fn with_gps_jitter(mut self, meters: f64) -> Self {
        self.config.gps_jitter_m = meters;
        self
    }

    pub fn with_sample_interval(mut self, interval: std::time::Duration) -> Self {
        self.config.sample_interval = interval;
        self
    }

    /// Sets the share of readings replaced by a [`Glitch`].
    pub fn with_glitches(mut self, probability: f64) -> Self {
        self.config.glitch_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Generates a walk starting at `start_millis`, one reading per sample
    /// interval, paced by `profile`.
    pub fn generate(
        &self,
        profile: &dyn AthleteProfile,
        start_millis: i64,
        rng: &mut impl Rng,
    ) -> GeneratedWalk {
        let start = self
            .config
            .start_point
            .unwrap_or_else(|| self.config.bounds.random_point(rng));

        let speed = profiles::speed_for_day(profile, profiles::sample_variance(profile, rng));
        let interval = self.config.sample_interval.as_secs_f64();
        let path = self.generate_path(start, speed * interval, rng);
        let path_meters = path
            .windows(2)
            .map(|w| {
                geodesy::distance_km(Coordinate::new(w[0].0, w[0].1), Coordinate::new(w[1].0, w[1].1))
            })
            .sum::<f64>()
            * 1000.0;

        let jitter = Normal::new(0.0, self.config.gps_jitter_m / 111_000.0).ok();
        let interval_millis = self.config.sample_interval.as_millis() as i64;
        let mut glitches = 0;

        let positions = path
            .into_iter()
            .enumerate()
            .map(|(i, (lat, lon))| {
                let (dlat, dlon) = match &jitter {
                    Some(normal) => (normal.sample(rng), normal.sample(rng)),
                    None => (0.0, 0.0),
                };
                let raw = RawPosition::new(lat + dlat, lon + dlon, start_millis + i as i64 * interval_millis);

                if rng.gen_bool(self.config.glitch_probability) {
                    glitches += 1;
                    let glitch = Glitch::ALL[rng.gen_range(0..Glitch::ALL.len())];
                    glitch.corrupt(raw, rng)
                } else {
                    raw
                }
            })
            .collect();

        GeneratedWalk {
            positions,
            glitches,
            path_meters,
        }
    }

    /// Random walk with momentum; `step_m` is the mean distance covered
    /// between readings.
    fn generate_path(&self, start: (f64, f64), step_m: f64, rng: &mut impl Rng) -> Vec<(f64, f64)> {
        let mut path = vec![start];
        let mut current = start;
        let mut total_distance = 0.0;
        let mut heading = rng.gen_range(0.0..std::f64::consts::TAU);

        while total_distance < self.config.distance_meters {
            heading += rng.gen_range(-0.3..0.3);
            let step = step_m * rng.gen_range(0.8..1.2);

            // 1 degree of latitude is roughly 111 km
            let lat_delta = (step * heading.cos()) / 111_000.0;
            let lon_delta = (step * heading.sin()) / (111_000.0 * current.0.to_radians().cos());

            let (lat, lon, bounced) = self.apply_bounds(current.0 + lat_delta, current.1 + lon_delta, heading);
            heading = bounced;
            current = (lat, lon);
            path.push(current);
            total_distance += step;
        }

        path
    }

    /// Keeps the walker inside the bounds by turning them around at the edge.
    fn apply_bounds(&self, lat: f64, lon: f64, heading: f64) -> (f64, f64, f64) {
        let b = &self.config.bounds;
        let mut new_heading = heading;

        let lat = if lat < b.min_lat {
            new_heading = std::f64::consts::PI - heading;
            b.min_lat
        } else if lat > b.max_lat {
            new_heading = std::f64::consts::PI - heading;
            b.max_lat
        } else {
            lat
        };

        let lon = if lon < b.min_lon {
            new_heading = -heading;
            b.min_lon
        } else if lon > b.max_lon {
            new_heading = -heading;
            b.max_lon
        } else {
            lon
        };

        (lat, lon, new_heading)
    }
}

/// A short walk around Ibirapuera with default pacing.
pub fn sample_walk(seed: u64) -> GeneratedWalk {
    use rand::SeedableRng;

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    WalkGenerator::for_region(Region::IBIRAPUERA).generate(
        &crate::profiles::WalkerProfile::default(),
        0,
        &mut rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::WalkerProfile;
    use rand::{SeedableRng, rngs::StdRng};
    use tracker::sample_filter;

    #[test]
    fn test_generate_walk() {
        let mut rng = StdRng::seed_from_u64(42);
        let walk = WalkGenerator::new()
            .with_distance(1000.0)
            .generate(&WalkerProfile::default(), 0, &mut rng);

        // ~1.4 m per reading
        assert!(walk.positions.len() > 400);
        assert_eq!(walk.glitches, 0);
        assert!(walk.path_meters > 900.0 && walk.path_meters < 1200.0);
        assert!(walk.positions.iter().all(|p| sample_filter::accept(p).is_ok()));
    }

    #[test]
    fn test_timestamps_follow_interval() {
        let mut rng = StdRng::seed_from_u64(42);
        let walk = WalkGenerator::new()
            .with_distance(200.0)
            .with_sample_interval(std::time::Duration::from_secs(2))
            .generate(&WalkerProfile::default(), 10_000, &mut rng);

        assert_eq!(walk.positions[0].captured_at_millis, 10_000);
        for window in walk.positions.windows(2) {
            assert_eq!(window[1].captured_at_millis - window[0].captured_at_millis, 2000);
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let a = sample_walk(9);
        let b = sample_walk(9);
        assert_eq!(a.positions, b.positions);
    }

    #[test]
    fn test_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = Region::HYDE_PARK;
        let walk = WalkGenerator::for_region(bounds)
            .with_distance(5000.0)
            .with_gps_jitter(0.0)
            .generate(&WalkerProfile::brisk(), 0, &mut rng);

        for p in &walk.positions {
            assert!(bounds.contains(p.latitude.unwrap(), p.longitude.unwrap()));
        }
    }

    #[test]
    fn test_glitches_are_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let walk = WalkGenerator::new()
            .with_distance(1500.0)
            .with_glitches(0.1)
            .generate(&WalkerProfile::default(), 0, &mut rng);

        let rejected = walk
            .positions
            .iter()
            .filter(|p| sample_filter::accept(p).is_err())
            .count();
        assert!(walk.glitches > 0);
        assert_eq!(rejected, walk.glitches);
        assert_eq!(walk.valid_count(), walk.positions.len() - rejected);
    }
}
