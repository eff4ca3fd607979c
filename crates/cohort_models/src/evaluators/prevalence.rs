//! Marginal prevalence of a logistic binary outcome.

use super::SimulationDataset;
use crate::rng::SeededSource;
use cohort_core::math::numerics::logistic;
use cohort_core::traits::Evaluator;
use cohort_core::types::EvaluationError;

/// Maps a logistic intercept to the simulated outcome prevalence.
///
/// Every call replays `source` from the start, draws one uniform `u_i` per
/// observation and sets `y_i = 1` when `u_i < logistic(intercept + lp_i)`.
/// Because the uniforms are identical on every call, the prevalence is a
/// non-decreasing step function of the intercept.
///
/// # Example
///
/// ```
/// use cohort_core::traits::Evaluator;
/// use cohort_models::evaluators::{PrevalenceEvaluator, SimulationDataset};
/// use cohort_models::rng::SeededSource;
///
/// let dataset = SimulationDataset::intercept_only(1_000).unwrap();
/// let mut evaluator = PrevalenceEvaluator::new(dataset, SeededSource::new(1));
///
/// let low = evaluator.evaluate(-2.0).unwrap();
/// let high = evaluator.evaluate(2.0).unwrap();
/// assert!(low < 0.5 && 0.5 < high);
/// ```
#[derive(Clone, Debug)]
pub struct PrevalenceEvaluator {
    dataset: SimulationDataset,
    source: SeededSource,
}

impl PrevalenceEvaluator {
    /// Create an evaluator over `dataset`, drawing outcomes from `source`.
    pub fn new(dataset: SimulationDataset, source: SeededSource) -> Self {
        Self { dataset, source }
    }

    /// Dataset the outcomes are simulated on.
    pub fn dataset(&self) -> &SimulationDataset {
        &self.dataset
    }

    /// Outcome stream.
    pub fn source(&self) -> SeededSource {
        self.source
    }

    /// Number of positive outcomes at `intercept`.
    pub fn positives(&self, intercept: f64) -> usize {
        let mut rng = self.source.replay();
        self.dataset
            .linear_predictor()
            .iter()
            .filter(|&&lp| rng.gen_uniform() < logistic(intercept + lp))
            .count()
    }
}

impl Evaluator for PrevalenceEvaluator {
    fn evaluate(&mut self, parameter: f64) -> Result<f64, EvaluationError> {
        Ok(self.positives(parameter) as f64 / self.dataset.n_obs() as f64)
    }
}
