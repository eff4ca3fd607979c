//! The two calibration entry points: outcome prevalence and marginal hazard
//! ratio.
//!
//! Both derive independent streams from a single seed: one for the covariate
//! design, one for the outcome draws.

use super::{CalibrationConfig, CalibrationError, CalibrationResult, Calibrator};
use crate::evaluators::{CohortDesign, MarginalHazardRatioEvaluator, PrevalenceEvaluator};
use crate::rng::SeededSource;
use crate::survival::WeibullBaseline;
use cohort_core::math::solvers::SolverConfig;
use tracing::info;

/// Sub-stream feeding covariate generation.
pub const COVARIATE_STREAM: u64 = 0;

/// Sub-stream feeding outcome or event-time draws.
pub const OUTCOME_STREAM: u64 = 1;

/// Default seed for both scenarios.
pub const DEFAULT_SEED: u64 = 42;

/// Calibrate a logistic intercept to a target marginal prevalence.
///
/// The search starts at intercept 0.
///
/// # Example
///
/// ```
/// use cohort_models::calibration::PrevalenceCalibration;
/// use cohort_models::evaluators::CohortDesign;
///
/// let result = PrevalenceCalibration::new(0.2, CohortDesign::intercept_only(2_000))
///     .with_seed(7)
///     .run()
///     .unwrap();
/// assert!(result.converged);
/// assert!((result.statistic() - 0.2).abs() < 1e-5);
/// ```
#[derive(Clone, Debug)]
pub struct PrevalenceCalibration {
    target_prevalence: f64,
    design: CohortDesign,
    tolerance: f64,
    max_iterations: usize,
    seed: u64,
}

impl PrevalenceCalibration {
    /// Calibration towards `target_prevalence` on `design`.
    pub fn new(target_prevalence: f64, design: CohortDesign) -> Self {
        let defaults = SolverConfig::default();
        Self {
            target_prevalence,
            design,
            tolerance: defaults.tolerance,
            max_iterations: defaults.max_iterations,
            seed: DEFAULT_SEED,
        }
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the per-phase iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Target prevalence.
    pub fn target_prevalence(&self) -> f64 {
        self.target_prevalence
    }

    /// Seed for this run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Calibration settings.
    pub fn config(&self) -> CalibrationConfig {
        CalibrationConfig::new(self.target_prevalence)
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
    }

    /// Build the seed-pinned evaluator this run calibrates against.
    ///
    /// # Errors
    ///
    /// `InvalidTarget` unless the target lies in (0, 1); `Covariate` if the
    /// design cannot be simulated.
    pub fn evaluator(&self) -> Result<PrevalenceEvaluator, CalibrationError> {
        if !(self.target_prevalence > 0.0 && self.target_prevalence < 1.0) {
            return Err(CalibrationError::invalid_target(format!(
                "prevalence must lie in (0, 1), got {}",
                self.target_prevalence
            )));
        }
        let source = SeededSource::new(self.seed);
        let dataset = self.design.simulate(&source.derive(COVARIATE_STREAM))?;
        Ok(PrevalenceEvaluator::new(dataset, source.derive(OUTCOME_STREAM)))
    }

    /// Run the calibration.
    pub fn run(&self) -> Result<CalibrationResult, CalibrationError> {
        let mut evaluator = self.evaluator()?;
        info!(
            seed = self.seed,
            n_obs = self.design.n_obs(),
            target_prevalence = self.target_prevalence,
            "Prevalence calibration"
        );
        Calibrator::new(self.config()).calibrate(&mut evaluator, 0.0)
    }
}

/// Calibrate a conditional treatment coefficient to a target marginal hazard
/// ratio.
///
/// The statistic is the fitted marginal log hazard ratio, so the target is
/// `ln(target_hazard_ratio)`; the search starts there too.
///
/// With prognostic covariates the conditional coefficient that achieves a
/// given marginal hazard ratio is larger in magnitude than its logarithm,
/// because the Cox hazard ratio is non-collapsible.
#[derive(Clone, Debug)]
pub struct HazardRatioCalibration {
    target_hazard_ratio: f64,
    baseline: WeibullBaseline,
    design: CohortDesign,
    tolerance: f64,
    max_iterations: usize,
    seed: u64,
}

impl HazardRatioCalibration {
    /// Calibration towards `target_hazard_ratio` on `design`.
    pub fn new(target_hazard_ratio: f64, baseline: WeibullBaseline, design: CohortDesign) -> Self {
        let defaults = SolverConfig::default();
        Self {
            target_hazard_ratio,
            baseline,
            design,
            tolerance: defaults.tolerance,
            max_iterations: defaults.max_iterations,
            seed: DEFAULT_SEED,
        }
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the tolerance on the log hazard ratio.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the per-phase iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Target marginal hazard ratio.
    pub fn target_hazard_ratio(&self) -> f64 {
        self.target_hazard_ratio
    }

    /// Seed for this run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Calibration settings (target on the log scale).
    pub fn config(&self) -> CalibrationConfig {
        CalibrationConfig::new(self.target_hazard_ratio.ln())
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
    }

    /// Build the seed-pinned evaluator this run calibrates against.
    ///
    /// # Errors
    ///
    /// `InvalidTarget` unless the hazard ratio is positive and finite;
    /// `Covariate` if the design cannot be simulated.
    pub fn evaluator(&self) -> Result<MarginalHazardRatioEvaluator, CalibrationError> {
        if !(self.target_hazard_ratio > 0.0 && self.target_hazard_ratio.is_finite()) {
            return Err(CalibrationError::invalid_target(format!(
                "hazard ratio must be positive and finite, got {}",
                self.target_hazard_ratio
            )));
        }
        let source = SeededSource::new(self.seed);
        let dataset = self.design.simulate(&source.derive(COVARIATE_STREAM))?;
        Ok(MarginalHazardRatioEvaluator::new(
            dataset,
            self.baseline,
            source.derive(OUTCOME_STREAM),
        ))
    }

    /// Run the calibration.
    pub fn run(&self) -> Result<CalibrationResult, CalibrationError> {
        let mut evaluator = self.evaluator()?;
        let config = self.config();
        info!(
            seed = self.seed,
            n_obs = self.design.n_obs(),
            target_hazard_ratio = self.target_hazard_ratio,
            lambda = self.baseline.lambda(),
            eta = self.baseline.eta(),
            "Marginal hazard ratio calibration"
        );
        Calibrator::new(config).calibrate(&mut evaluator, config.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevalence_target_validation() {
        for bad in [0.0, 1.0, -0.1, f64::NAN] {
            let err = PrevalenceCalibration::new(bad, CohortDesign::intercept_only(10))
                .run()
                .unwrap_err();
            assert!(matches!(err, CalibrationError::InvalidTarget { .. }));
        }
    }

    #[test]
    fn test_hazard_ratio_target_validation() {
        let baseline = WeibullBaseline::new(2e-5, 2.0).unwrap();
        for bad in [0.0, -2.0, f64::INFINITY] {
            let err = HazardRatioCalibration::new(bad, baseline, CohortDesign::intercept_only(10))
                .run()
                .unwrap_err();
            assert!(matches!(err, CalibrationError::InvalidTarget { .. }));
        }
    }

    #[test]
    fn test_empty_design_rejected() {
        let err = PrevalenceCalibration::new(0.5, CohortDesign::intercept_only(0))
            .run()
            .unwrap_err();
        assert!(matches!(err, CalibrationError::Covariate(_)));
    }

    #[test]
    fn test_hazard_ratio_config_uses_log_scale() {
        let baseline = WeibullBaseline::new(1.0, 1.0).unwrap();
        let calibration = HazardRatioCalibration::new(2.0, baseline, CohortDesign::intercept_only(10))
            .with_tolerance(1e-4)
            .with_max_iterations(30)
            .with_seed(9);
        let config = calibration.config();
        assert!((config.target - 2.0_f64.ln()).abs() < 1e-15);
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_iterations, 30);
        assert_eq!(calibration.seed(), 9);
    }

    #[test]
    fn test_prevalence_run_is_reproducible() {
        let calibration =
            PrevalenceCalibration::new(0.3, CohortDesign::intercept_only(1_000)).with_seed(5);
        let a = calibration.run().unwrap();
        let b = calibration.run().unwrap();
        assert_eq!(a.estimate, b.estimate);
        assert_eq!(a.history, b.history);
    }
}
