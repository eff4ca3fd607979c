//! Capability traits for the calibration engine.
//!
//! - [`Evaluator`]: Maps a candidate parameter to the statistic it induces

pub mod evaluator;

pub use evaluator::{Evaluator, FnEvaluator};
