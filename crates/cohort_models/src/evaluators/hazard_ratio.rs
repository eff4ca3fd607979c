//! Marginal hazard ratio from pooled potential outcomes.

use super::SimulationDataset;
use crate::rng::SeededSource;
use crate::survival::{CoxConfig, CoxData, CoxFit, CoxRegression, WeibullBaseline};
use cohort_core::traits::Evaluator;
use cohort_core::types::EvaluationError;
use tracing::trace;

/// Maps a conditional log hazard ratio to the fitted marginal log hazard ratio.
///
/// For every observation two potential event times are generated from one
/// persistent uniform `U_i`, under control (`z = 0`) and under treatment
/// (`z = 1`):
///
/// ```text
/// T_i(z) = (-ln U_i / (lambda * exp(parameter * z + lp_i)))^(1 / eta)
/// ```
///
/// The `2N` rows are pooled without censoring and a Cox model with the
/// treatment indicator as its only covariate is fitted. The fitted
/// coefficient is the marginal log hazard ratio.
///
/// The uniforms are drawn once at construction, so repeated calls differ only
/// through `parameter`.
///
/// # Example
///
/// ```
/// use cohort_core::traits::Evaluator;
/// use cohort_models::evaluators::{MarginalHazardRatioEvaluator, SimulationDataset};
/// use cohort_models::rng::SeededSource;
/// use cohort_models::survival::WeibullBaseline;
///
/// let dataset = SimulationDataset::intercept_only(2_000).unwrap();
/// let baseline = WeibullBaseline::new(2e-5, 2.0).unwrap();
/// let mut evaluator =
///     MarginalHazardRatioEvaluator::new(dataset, baseline, SeededSource::new(5));
///
/// // Without covariates the marginal and conditional effects coincide
/// let fitted = evaluator.evaluate(0.5).unwrap();
/// assert!((fitted - 0.5).abs() < 0.1);
/// ```
#[derive(Clone, Debug)]
pub struct MarginalHazardRatioEvaluator {
    dataset: SimulationDataset,
    baseline: WeibullBaseline,
    cox: CoxRegression,
    log_neg_log_u: Vec<f64>,
    times: Vec<f64>,
    events: Vec<bool>,
    treatment: Vec<f64>,
    last_fit: Option<CoxFit>,
}

impl MarginalHazardRatioEvaluator {
    /// Create an evaluator, drawing one uniform per observation from `source`.
    pub fn new(dataset: SimulationDataset, baseline: WeibullBaseline, source: SeededSource) -> Self {
        let n = dataset.n_obs();
        let mut rng = source.replay();
        let log_neg_log_u = (0..n)
            .map(|_| (-rng.gen_open_uniform().ln()).ln())
            .collect();

        let mut treatment = vec![0.0; 2 * n];
        treatment[n..].iter_mut().for_each(|z| *z = 1.0);

        Self {
            dataset,
            baseline,
            cox: CoxRegression::default(),
            log_neg_log_u,
            times: vec![0.0; 2 * n],
            events: vec![true; 2 * n],
            treatment,
            last_fit: None,
        }
    }

    /// Override the Cox fitter configuration.
    pub fn with_cox_config(mut self, config: CoxConfig) -> Self {
        self.cox = CoxRegression::new(config);
        self
    }

    /// Weibull baseline.
    pub fn baseline(&self) -> &WeibullBaseline {
        &self.baseline
    }

    /// Dataset the event times are generated on.
    pub fn dataset(&self) -> &SimulationDataset {
        &self.dataset
    }

    /// Cox fit from the most recent successful evaluation.
    pub fn last_fit(&self) -> Option<&CoxFit> {
        self.last_fit.as_ref()
    }

    /// Fill the pooled event times for `parameter`.
    fn simulate(&mut self, parameter: f64) {
        let n = self.dataset.n_obs();
        let lp = self.dataset.linear_predictor();
        for i in 0..n {
            let w = self.log_neg_log_u[i];
            self.times[i] = self.baseline.event_time(w, lp[i]);
            self.times[n + i] = self.baseline.event_time(w, parameter + lp[i]);
        }
    }
}

impl Evaluator for MarginalHazardRatioEvaluator {
    fn evaluate(&mut self, parameter: f64) -> Result<f64, EvaluationError> {
        self.simulate(parameter);

        let data = CoxData::new(&self.times, &self.events, &self.treatment, 1)
            .map_err(|e| EvaluationError::failed(parameter, e.to_string()))?;
        let fit = self
            .cox
            .fit(&data)
            .map_err(|e| EvaluationError::failed(parameter, e.to_string()))?;

        let coefficient = fit.coefficients[0];
        trace!(
            parameter,
            coefficient,
            cox_iterations = fit.iterations,
            "Marginal hazard ratio evaluated"
        );
        self.last_fit = Some(fit);
        Ok(coefficient)
    }
}
