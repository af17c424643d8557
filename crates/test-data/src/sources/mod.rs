//! Synthetic position sources.
//!
//! - [`WalkGenerator`]: seeded random walks paced by an athlete profile,
//!   optionally sprinkled with unusable readings

mod walk;

pub use walk::{GeneratedWalk, Glitch, WalkGenerator, sample_walk};
