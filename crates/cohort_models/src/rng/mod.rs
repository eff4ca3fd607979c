//! # Random Number Generation Infrastructure
//!
//! Seeded, replayable random streams for cohort simulation.
//!
//! ## Design Rationale
//!
//! Calibration evaluates the same simulator at many parameter values. For the
//! induced statistic to be a smooth, low-noise function of the parameter,
//! every evaluation must consume the *same* random numbers. This module
//! therefore separates two things:
//!
//! - [`SeededSource`]: an immutable description of a stream (a seed), which
//!   can be replayed from the start any number of times
//! - [`SimRng`]: a live generator positioned somewhere in that stream
//!
//! An evaluator holds a `SeededSource` and calls [`SeededSource::replay`] at
//! the start of every evaluation ("re-seed and redraw") rather than advancing
//! a persistent generator.
//!
//! Independent concerns within one run (covariates, outcomes, event-time
//! uniforms) use [`SeededSource::derive`] to obtain non-overlapping streams
//! from a single configured seed.
//!
//! ## Usage Example
//!
//! ```rust
//! use cohort_models::rng::SeededSource;
//!
//! let source = SeededSource::new(2024);
//!
//! let mut first = source.replay();
//! let mut second = source.replay();
//! assert_eq!(first.gen_uniform(), second.gen_uniform());
//!
//! let covariates = source.derive(1);
//! assert_ne!(covariates.seed(), source.seed());
//! ```
//!
//! ## Reproducibility Scope
//!
//! Streams are reproducible for a given build. `rand::rngs::StdRng` does not
//! promise a stable algorithm across `rand` releases.

mod source;

pub use source::{SeededSource, SimRng};
