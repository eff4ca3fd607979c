//! Per-run calibration configuration.

use super::CalibrationError;
use cohort_core::math::solvers::SolverConfig;

/// Target, tolerance and iteration cap for one calibration run.
///
/// Immutable once the run starts. The iteration cap applies to each search
/// phase separately.
///
/// # Example
///
/// ```
/// use cohort_models::calibration::CalibrationConfig;
///
/// let config = CalibrationConfig::new(0.3).with_tolerance(1e-4);
/// assert_eq!(config.target, 0.3);
/// assert_eq!(config.solver_config().tolerance, 1e-4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    /// Statistic value to reach.
    pub target: f64,
    /// Convergence tolerance on `|statistic - target|`.
    pub tolerance: f64,
    /// Iteration cap per search phase.
    pub max_iterations: usize,
}

impl CalibrationConfig {
    /// Configuration for `target` with default tolerance and iteration cap.
    pub fn new(target: f64) -> Self {
        let defaults = SolverConfig::default();
        Self {
            target,
            tolerance: defaults.tolerance,
            max_iterations: defaults.max_iterations,
        }
    }

    /// Set the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Solver settings shared by both search phases.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidTarget` for a non-finite target
    /// - `Solver(InvalidConfig)` for a non-positive tolerance or a zero cap
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.target.is_finite() {
            return Err(CalibrationError::invalid_target(format!(
                "target must be finite, got {}",
                self.target
            )));
        }
        self.solver_config().validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::types::SolverError;

    #[test]
    fn test_defaults_follow_solver() {
        let config = CalibrationConfig::new(0.5);
        assert_eq!(config.tolerance, SolverConfig::default().tolerance);
        assert_eq!(config.max_iterations, SolverConfig::default().max_iterations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_finite_target() {
        assert!(matches!(
            CalibrationConfig::new(f64::NAN).validate(),
            Err(CalibrationError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_solver_settings() {
        assert!(matches!(
            CalibrationConfig::new(0.5).with_tolerance(0.0).validate(),
            Err(CalibrationError::Solver(SolverError::InvalidConfig(_)))
        ));
        assert!(matches!(
            CalibrationConfig::new(0.5).with_max_iterations(0).validate(),
            Err(CalibrationError::Solver(SolverError::InvalidConfig(_)))
        ));
    }
}
