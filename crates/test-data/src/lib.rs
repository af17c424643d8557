//! Synthetic walk data for the walk tracker.
//!
//! Generates realistic GPS readings for exercising the tracking engine
//! end to end, or for writing out as GPX and replaying later.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let walk = WalkGenerator::for_region(Region::CENTRAL_PARK)
//!     .with_distance(3000.0)
//!     .with_glitches(0.02)
//!     .generate(&WalkerProfile::brisk(), 0, &mut rng);
//! ```

pub mod config;
pub mod gpx;
pub mod profiles;
pub mod sources;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{BoundingBox, Region, WalkConfig};
    pub use crate::profiles::{AthleteProfile, WalkerProfile, sample_variance, speed_for_day};
    pub use crate::sources::{GeneratedWalk, Glitch, WalkGenerator, sample_walk};
    pub use rand::{SeedableRng, rngs::StdRng};
}
