//! Bisection refinement of a bracketed calibration state.

use super::{evaluate_finite, SolverConfig};
use crate::traits::Evaluator;
use crate::types::{CalibrationState, EvaluationRecord, SearchPhase, SolverError};
use tracing::debug;

/// Bisection on the statistic, starting from a bracketed state.
///
/// Each iteration moves the current parameter by half the bracket width,
/// upwards if the current statistic is below the target and downwards
/// otherwise, then lets the newly evaluated statistic decide which bound moves
/// to the new parameter:
///
/// ```text
/// step   = |hi - lo| / 2
/// param  = param + step   if stat < target
///        = param - step   otherwise
/// stat   = evaluate(param)
/// lo     = param          if stat < target
/// hi     = param          if stat > target
/// ```
///
/// The step uses the width *before* the bound update. Because the previous
/// parameter is always one of the current bounds (the bracket phase ends on a
/// bound and every iteration's parameter becomes a bound), this matches
/// standard midpoint bisection.
///
/// # Example
///
/// ```
/// use cohort_core::math::solvers::{BisectionRefiner, SolverConfig};
/// use cohort_core::traits::FnEvaluator;
/// use cohort_core::types::{CalibrationState, EvaluationRecord};
///
/// // Bracket [1, 2] for p² = 2, last evaluated at the upper bound
/// let mut state = CalibrationState::new(2.0, 4.0, 2.0);
/// state.lower_bound = Some(1.0);
/// state.upper_bound = Some(2.0);
///
/// let refiner = BisectionRefiner::new(SolverConfig::new(1e-10, 100));
/// let mut evaluator = FnEvaluator::new(|p: f64| p * p);
/// let mut record = EvaluationRecord::new();
///
/// let done = refiner.refine(&mut evaluator, state, &mut record).unwrap();
/// assert!((done.current_param - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BisectionRefiner {
    config: SolverConfig,
}

impl BisectionRefiner {
    /// Create a refiner with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a refiner with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Refine `bracketed` until `|statistic - target| < tolerance`.
    ///
    /// The incoming state becomes this phase's iteration-0 state. Every
    /// evaluation is appended to `record`.
    ///
    /// # Returns
    ///
    /// * `Ok(state)` - Converged, stopped state; returned with iteration 0 and
    ///   no evaluations if the input already satisfies the tolerance
    ///   (including the degenerate `[p, p]` bracket)
    /// * `Err(SolverError::MaxIterationsExceeded)` - Tolerance not reached in
    ///   `max_iterations` evaluations; carries the best parameter seen and the
    ///   final distance to the target
    /// * `Err(SolverError::Unbracketed)` - `bracketed` has no bounds
    /// * `Err(SolverError::Evaluation)` - The evaluator failed or returned a
    ///   non-finite statistic
    pub fn refine<E: Evaluator + ?Sized>(
        &self,
        evaluator: &mut E,
        bracketed: CalibrationState,
        record: &mut EvaluationRecord,
    ) -> Result<CalibrationState, SolverError> {
        self.config.validate()?;

        let (mut lo, mut hi) = bracketed.bracket().ok_or(SolverError::Unbracketed {
            param: bracketed.current_param,
        })?;

        let mut state = CalibrationState {
            iteration: 0,
            stopped: false,
            ..bracketed
        };

        if state.diff() < self.config.tolerance {
            state.stopped = true;
            debug!(
                param = state.current_param,
                diff = state.diff(),
                "Already within tolerance, bisection skipped"
            );
            return Ok(state);
        }

        let target = state.target_stat;
        let mut best = (state.current_param, state.current_stat, state.diff());

        while state.iteration < self.config.max_iterations {
            state.iteration += 1;

            let step = (hi - lo).abs() / 2.0;
            if state.current_stat < target {
                state.current_param += step;
            } else {
                state.current_param -= step;
            }

            let stat = evaluate_finite(evaluator, state.current_param)?;
            state.current_stat = stat;

            if stat < target {
                lo = state.current_param;
            } else if stat > target {
                hi = state.current_param;
            }
            state.lower_bound = Some(lo);
            state.upper_bound = Some(hi);

            let diff = state.diff();
            if diff < best.2 {
                best = (state.current_param, stat, diff);
            }

            if diff < self.config.tolerance {
                state.stopped = true;
                record.push(SearchPhase::Bisection, &state);
                debug!(
                    iteration = state.iteration,
                    param = state.current_param,
                    stat,
                    diff,
                    "Bisection converged"
                );
                return Ok(state);
            }

            record.push(SearchPhase::Bisection, &state);
            debug!(
                iteration = state.iteration,
                param = state.current_param,
                stat,
                diff,
                lo,
                hi,
                "Bisection step"
            );
        }

        state.stopped = true;
        Err(SolverError::MaxIterationsExceeded {
            iterations: state.iteration,
            best_param: best.0,
            best_stat: best.1,
            final_diff: state.diff(),
        })
    }
}
