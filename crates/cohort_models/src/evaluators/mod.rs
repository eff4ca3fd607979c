//! Stochastic evaluators for the calibration search.
//!
//! Each evaluator owns a seed-pinned dataset and implements
//! [`Evaluator`](cohort_core::traits::Evaluator): the same parameter always
//! yields the same statistic.
//!
//! - [`PrevalenceEvaluator`]: logistic intercept to outcome prevalence
//! - [`MarginalHazardRatioEvaluator`]: conditional treatment coefficient to
//!   fitted marginal log hazard ratio

mod dataset;
mod hazard_ratio;
mod prevalence;

pub use dataset::{CohortDesign, SimulationDataset};
pub use hazard_ratio::MarginalHazardRatioEvaluator;
pub use prevalence::PrevalenceEvaluator;
