//! Athletic performance profiles.
//!
//! Profiles define realistic walking speeds. They are used by the walk
//! generator to space readings the way a real walker would.

mod walker;

pub use walker::WalkerProfile;

/// Trait for athletic performance profiles.
pub trait AthleteProfile: Send + Sync {
    /// Base speed on flat terrain in meters per second.
    fn base_speed_mps(&self) -> f64;

    /// Day-to-day performance variance as a coefficient of variation (0.0 - 1.0).
    ///
    /// A value of 0.1 means typical day-to-day variation of ±10%.
    fn variance(&self) -> f64;
}

/// Samples a variance factor from normal distribution.
/// Returns a multiplier around 1.0.
pub fn sample_variance(profile: &dyn AthleteProfile, rng: &mut impl rand::Rng) -> f64 {
    use rand_distr::{Distribution, Normal};

    match Normal::new(1.0, profile.variance()) {
        Ok(normal) if profile.variance() > 0.0 => normal.sample(rng).clamp(0.7, 1.4),
        _ => 1.0,
    }
}

/// Speed for one walk, never below a shuffle.
pub fn speed_for_day(profile: &dyn AthleteProfile, variance_factor: f64) -> f64 {
    (profile.base_speed_mps() * variance_factor).max(0.3)
}
