//! Walker athletic profile.

use super::AthleteProfile;

/// Athletic profile for walks.
///
/// Based on typical urban walking pace:
/// - Base speed: ~5.0 km/h (1.4 m/s)
/// - Day-to-day variance around 10%
#[derive(Debug, Clone)]
pub struct WalkerProfile {
    /// Base speed in m/s.
    base_speed: f64,
    /// Performance variance (coefficient of variation).
    variance: f64,
}

impl Default for WalkerProfile {
    fn default() -> Self {
        Self {
            base_speed: 1.4, // ~5 km/h
            variance: 0.1,
        }
    }
}

impl WalkerProfile {
    /// Creates a walker profile with the given pace in km/h.
    pub fn with_speed(speed_kmh: f64) -> Self {
        Self {
            base_speed: speed_kmh / 3.6,
            ..Default::default()
        }
    }

    /// Brisk walk (~6.5 km/h).
    pub fn brisk() -> Self {
        Self::with_speed(6.5)
    }

    /// Stroll (~3.5 km/h), with more variance.
    pub fn stroll() -> Self {
        Self {
            base_speed: 3.5 / 3.6,
            variance: 0.15,
        }
    }
}

impl AthleteProfile for WalkerProfile {
    fn base_speed_mps(&self) -> f64 {
        self.base_speed
    }

    fn variance(&self) -> f64 {
        self.variance
    }
}
