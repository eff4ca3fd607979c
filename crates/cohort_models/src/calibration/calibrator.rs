//! Two-phase calibrator with diagnostics.

use super::{
    CalibrationConfig, CalibrationDiagnostics, CalibrationError, CalibrationResult, Termination,
};
use cohort_core::math::solvers::{BisectionRefiner, BracketFinder};
use cohort_core::traits::Evaluator;
use cohort_core::types::{EvaluationRecord, ParameterEstimate, SolverError};
use std::time::Instant;
use tracing::{info, warn};

/// Runs bracket expansion then bisection against one evaluator.
///
/// # Example
///
/// ```
/// use cohort_core::traits::FnEvaluator;
/// use cohort_models::calibration::{CalibrationConfig, Calibrator, Termination};
///
/// let calibrator = Calibrator::new(CalibrationConfig::new(0.8).with_tolerance(1e-9));
/// let mut evaluator = FnEvaluator::new(|p: f64| 1.0 / (1.0 + (-p).exp()));
///
/// let result = calibrator.calibrate(&mut evaluator, 0.0).unwrap();
/// assert!(result.converged);
/// assert_eq!(result.diagnostics.termination, Termination::Converged);
/// assert!((result.parameter() - 4.0_f64.ln()).abs() < 1e-7);
/// ```
#[derive(Debug, Clone)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    /// Create a calibrator for `config`.
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrate, reporting non-convergence as an unconverged result.
    ///
    /// # Errors
    ///
    /// Invalid configuration and evaluator failures. Hitting either iteration
    /// cap is not an error here; see [`calibrate_or_error`](Self::calibrate_or_error).
    pub fn calibrate<E: Evaluator + ?Sized>(
        &self,
        evaluator: &mut E,
        initial_param: f64,
    ) -> Result<CalibrationResult, CalibrationError> {
        self.config.validate()?;
        let target = self.config.target;
        let solver = self.config.solver_config();

        info!(
            target_stat = target,
            initial_param,
            tolerance = solver.tolerance,
            max_iterations = solver.max_iterations,
            "Calibration started"
        );
        let start = Instant::now();
        let mut history = EvaluationRecord::new();

        let finder = BracketFinder::new(solver);
        let bracketed = match finder.find(evaluator, initial_param, target, &mut history) {
            Ok(state) => state,
            Err(SolverError::BracketNotFound {
                iterations,
                last_param,
                last_stat,
                ..
            }) => {
                let estimate = best_estimate(&history).unwrap_or(ParameterEstimate {
                    estimated_parameter: last_param,
                    induced_statistic: last_stat,
                    target_statistic: target,
                });
                let diagnostics = CalibrationDiagnostics {
                    bracket_iterations: iterations,
                    bisection_iterations: 0,
                    evaluations: history.len(),
                    bracket: None,
                    final_diff: (last_stat - target).abs(),
                    duration: start.elapsed(),
                    termination: Termination::BracketNotFound,
                };
                warn!(
                    iterations,
                    last_param,
                    last_stat,
                    target_stat = target,
                    "No bracket found; target may be outside the attainable range"
                );
                return Ok(CalibrationResult::failure(estimate, diagnostics, history));
            }
            Err(e) => return Err(e.into()),
        };

        let bracket_iterations = bracketed.iteration;
        let degenerate = bracketed.is_degenerate();

        match BisectionRefiner::new(solver).refine(evaluator, bracketed, &mut history) {
            Ok(state) => {
                let diagnostics = CalibrationDiagnostics {
                    bracket_iterations,
                    bisection_iterations: state.iteration,
                    evaluations: history.len(),
                    bracket: state.bracket(),
                    final_diff: state.diff(),
                    duration: start.elapsed(),
                    termination: if degenerate {
                        Termination::ExactMatch
                    } else {
                        Termination::Converged
                    },
                };
                info!(
                    param = state.current_param,
                    stat = state.current_stat,
                    bracket_iterations,
                    bisection_iterations = state.iteration,
                    evaluations = diagnostics.evaluations,
                    duration_ms = diagnostics.duration.as_secs_f64() * 1e3,
                    "Calibration converged"
                );
                Ok(CalibrationResult::success(state.estimate(), diagnostics, history))
            }
            Err(SolverError::MaxIterationsExceeded {
                iterations,
                best_param,
                best_stat,
                final_diff,
            }) => {
                let last_bracket = history.last().and_then(|entry| entry.state.bracket());
                let diagnostics = CalibrationDiagnostics {
                    bracket_iterations,
                    bisection_iterations: iterations,
                    evaluations: history.len(),
                    bracket: last_bracket,
                    final_diff,
                    duration: start.elapsed(),
                    termination: Termination::MaxIterationsExceeded,
                };
                warn!(
                    iterations,
                    best_param,
                    best_stat,
                    final_diff,
                    "Bisection did not reach tolerance"
                );
                let estimate = ParameterEstimate {
                    estimated_parameter: best_param,
                    induced_statistic: best_stat,
                    target_statistic: target,
                };
                Ok(CalibrationResult::failure(estimate, diagnostics, history))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Calibrate and return `CalibrationError` on non-convergence.
    pub fn calibrate_or_error<E: Evaluator + ?Sized>(
        &self,
        evaluator: &mut E,
        initial_param: f64,
    ) -> Result<CalibrationResult, CalibrationError> {
        let result = self.calibrate(evaluator, initial_param)?;
        if result.converged {
            return Ok(result);
        }

        let diagnostics = &result.diagnostics;
        Err(match diagnostics.termination {
            Termination::BracketNotFound => {
                let last = result.history.last().map(|entry| entry.state);
                CalibrationError::bracket_not_found(
                    diagnostics.bracket_iterations,
                    last.map_or(result.parameter(), |s| s.current_param),
                    last.map_or(result.statistic(), |s| s.current_stat),
                )
            }
            _ => CalibrationError::not_converged(
                diagnostics.bisection_iterations,
                result.parameter(),
                result.statistic(),
                diagnostics.final_diff,
            ),
        })
    }
}

/// Recorded state closest to the target.
fn best_estimate(history: &EvaluationRecord) -> Option<ParameterEstimate> {
    history
        .iter()
        .map(|entry| entry.state)
        .min_by(|a, b| a.diff().total_cmp(&b.diff()))
        .map(|state| state.estimate())
}
