//! Configuration types for synthetic walk generation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Minimum longitude (west)
    pub min_lon: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Maximum longitude (east)
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Returns a random point within the bounding box.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..self.max_lat);
        let lon = rng.gen_range(self.min_lon..self.max_lon);
        (lat, lon)
    }

    /// Returns the center of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Pre-defined urban parks to walk in.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// Ibirapuera park, São Paulo.
    pub const IBIRAPUERA: BoundingBox = BoundingBox::new(-23.592, -46.665, -23.580, -46.650);

    /// Central Park, New York.
    pub const CENTRAL_PARK: BoundingBox = BoundingBox::new(40.765, -73.981, 40.800, -73.949);

    /// Hyde Park, London.
    pub const HYDE_PARK: BoundingBox = BoundingBox::new(51.502, -0.187, 51.512, -0.152);
}

/// Configuration for a generated walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Target distance in meters.
    pub distance_meters: f64,
    /// Starting point (lat, lon). If None, random within bounds.
    pub start_point: Option<(f64, f64)>,
    /// Geographic bounds for the walk.
    pub bounds: BoundingBox,
    /// GPS position jitter standard deviation in meters.
    pub gps_jitter_m: f64,
    /// Time between consecutive readings.
    pub sample_interval: Duration,
    /// Probability (0.0 - 1.0) that a reading comes out unusable.
    pub glitch_probability: f64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            distance_meters: 2000.0,
            start_point: None,
            bounds: Region::IBIRAPUERA,
            gps_jitter_m: 3.0,
            sample_interval: Duration::from_secs(1),
            glitch_probability: 0.0,
        }
    }
}
