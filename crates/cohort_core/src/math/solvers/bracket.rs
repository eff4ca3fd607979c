//! Fixed-step bracket expansion.

use super::{evaluate_finite, SolverConfig};
use crate::traits::Evaluator;
use crate::types::{CalibrationState, EvaluationRecord, SearchPhase, SolverError};
use tracing::debug;

/// Default expansion step in parameter space.
///
/// Both calibrated parameters live on a log scale (log-odds intercept,
/// log hazard ratio), where one unit already moves the statistic substantially.
pub const DEFAULT_BRACKET_STEP: f64 = 1.0;

/// Expanding-bracket search with a fixed step.
///
/// Starting from an initial parameter, steps in the direction that reduces
/// the error until the statistic reaches or crosses the target. On success
/// the returned state carries `lower_bound` and `upper_bound` such that the
/// evaluator's outputs at the two bounds straddle the target.
///
/// # Example
///
/// ```
/// use cohort_core::math::solvers::{BracketFinder, SolverConfig};
/// use cohort_core::traits::FnEvaluator;
/// use cohort_core::types::EvaluationRecord;
///
/// let finder = BracketFinder::new(SolverConfig::default());
/// let mut evaluator = FnEvaluator::new(|p: f64| 0.1 * p);
/// let mut record = EvaluationRecord::new();
///
/// let state = finder.find(&mut evaluator, 0.0, 0.25, &mut record).unwrap();
/// assert_eq!(state.bracket(), Some((2.0, 3.0)));
/// assert_eq!(state.iteration, 3);
/// assert_eq!(record.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct BracketFinder {
    config: SolverConfig,
    step: f64,
}

impl BracketFinder {
    /// Create a finder with the default unit step.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            step: DEFAULT_BRACKET_STEP,
        }
    }

    /// Create a finder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Override the expansion step.
    ///
    /// # Panics
    ///
    /// Panics if `step` is not positive and finite.
    pub fn with_step(mut self, step: f64) -> Self {
        assert!(step > 0.0 && step.is_finite(), "step must be positive");
        self.step = step;
        self
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Expansion step in parameter space.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Search for a bracket around `target`, starting at `initial_param`.
    ///
    /// Every evaluation is appended to `record`.
    ///
    /// # Returns
    ///
    /// * `Ok(state)` - Stopped state with both bounds set; degenerate
    ///   `[p, p]` with iteration 0 if the initial statistic equals the target
    /// * `Err(SolverError::BracketNotFound)` - No crossing within
    ///   `max_iterations` steps (`max_iterations + 1` evaluations)
    /// * `Err(SolverError::Evaluation)` - The evaluator failed or returned a
    ///   non-finite statistic
    pub fn find<E: Evaluator + ?Sized>(
        &self,
        evaluator: &mut E,
        initial_param: f64,
        target: f64,
        record: &mut EvaluationRecord,
    ) -> Result<CalibrationState, SolverError> {
        self.config.validate()?;

        let init_stat = evaluate_finite(evaluator, initial_param)?;
        let mut state = CalibrationState::new(initial_param, init_stat, target);

        if init_stat == target {
            state.lower_bound = Some(initial_param);
            state.upper_bound = Some(initial_param);
            state.stopped = true;
            record.push(SearchPhase::Initial, &state);
            debug!(
                param = initial_param,
                stat = init_stat,
                "Initial statistic matches target exactly"
            );
            return Ok(state);
        }
        record.push(SearchPhase::Initial, &state);

        let below = init_stat < target;
        let direction = if below { 1.0 } else { -1.0 };
        let mut previous = initial_param;

        debug!(
            param = initial_param,
            stat = init_stat,
            target_stat = target,
            direction,
            "Bracket search started"
        );

        while state.iteration < self.config.max_iterations {
            state.iteration += 1;
            let next = previous + direction * self.step;
            let stat = evaluate_finite(evaluator, next)?;
            state.current_param = next;
            state.current_stat = stat;

            let crossed = if below { stat >= target } else { stat <= target };
            if crossed {
                let (lo, hi) = if below {
                    (previous, next)
                } else {
                    (next, previous)
                };
                state.lower_bound = Some(lo);
                state.upper_bound = Some(hi);
                state.stopped = true;
                record.push(SearchPhase::Bracket, &state);
                debug!(
                    iteration = state.iteration,
                    lo,
                    hi,
                    stat,
                    "Bracket found"
                );
                return Ok(state);
            }

            record.push(SearchPhase::Bracket, &state);
            debug!(
                iteration = state.iteration,
                param = next,
                stat,
                "No crossing yet"
            );
            previous = next;
        }

        state.stopped = true;
        Err(SolverError::BracketNotFound {
            iterations: state.iteration,
            last_param: state.current_param,
            last_stat: state.current_stat,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FnEvaluator;
    use crate::types::EvaluationError;

    #[test]
    fn test_bracket_upwards() {
        let finder = BracketFinder::with_defaults();
        let mut e = FnEvaluator::new(|p: f64| p);
        let mut record = EvaluationRecord::new();

        let state = finder.find(&mut e, 0.0, 2.5, &mut record).unwrap();
        assert_eq!(state.bracket(), Some((2.0, 3.0)));
        assert_eq!(state.current_param, 3.0);
        assert!(state.stopped);
        assert_eq!(record.count(SearchPhase::Initial), 1);
        assert_eq!(record.count(SearchPhase::Bracket), 3);
    }

    #[test]
    fn test_bracket_downwards_orders_bounds() {
        let finder = BracketFinder::with_defaults();
        let mut e = FnEvaluator::new(|p: f64| p);
        let mut record = EvaluationRecord::new();

        let state = finder.find(&mut e, 0.0, -1.5, &mut record).unwrap();
        assert_eq!(state.bracket(), Some((-2.0, -1.0)));
        assert_eq!(state.current_param, -2.0);
    }

    #[test]
    fn test_reaching_target_counts_as_crossing() {
        let finder = BracketFinder::with_defaults();
        let mut e = FnEvaluator::new(|p: f64| p);
        let mut record = EvaluationRecord::new();

        let state = finder.find(&mut e, 0.0, 2.0, &mut record).unwrap();
        assert_eq!(state.bracket(), Some((1.0, 2.0)));
        assert_eq!(state.current_stat, 2.0);
    }

    #[test]
    fn test_exact_initial_match_is_degenerate() {
        let finder = BracketFinder::with_defaults();
        let mut calls = 0;
        let mut e = FnEvaluator::new(|_p: f64| {
            calls += 1;
            0.5
        });
        let mut record = EvaluationRecord::new();

        let state = finder.find(&mut e, 0.7, 0.5, &mut record).unwrap();
        assert!(state.is_degenerate());
        assert_eq!(state.iteration, 0);
        assert_eq!(state.current_param, 0.7);
        assert_eq!(record.len(), 1);
        drop(e);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_cap_gives_max_plus_one_evaluations() {
        let config = SolverConfig::new(1e-6, 7);
        let finder = BracketFinder::new(config);
        let mut calls = 0usize;
        // Saturated statistic that never reaches the target
        let mut e = FnEvaluator::new(|p: f64| {
            calls += 1;
            1.0 - (-p.abs()).exp()
        });
        let mut record = EvaluationRecord::new();

        let err = finder.find(&mut e, 0.0, 2.0, &mut record).unwrap_err();
        drop(e);
        assert_eq!(calls, 8);
        assert_eq!(record.len(), 8);
        match err {
            SolverError::BracketNotFound {
                iterations,
                last_param,
                target,
                ..
            } => {
                assert_eq!(iterations, 7);
                assert_eq!(last_param, 7.0);
                assert_eq!(target, 2.0);
            }
            other => panic!("Expected BracketNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_step() {
        let finder = BracketFinder::with_defaults().with_step(0.25);
        let mut e = FnEvaluator::new(|p: f64| p);
        let mut record = EvaluationRecord::new();

        let state = finder.find(&mut e, 0.0, 0.6, &mut record).unwrap();
        assert_eq!(state.bracket(), Some((0.5, 0.75)));
    }

    #[test]
    #[should_panic(expected = "step must be positive")]
    fn test_zero_step_panics() {
        let _ = BracketFinder::with_defaults().with_step(0.0);
    }

    #[test]
    fn test_non_finite_statistic_is_an_error() {
        let finder = BracketFinder::with_defaults();
        let mut e = FnEvaluator::new(|p: f64| if p > 1.5 { f64::NAN } else { p });
        let mut record = EvaluationRecord::new();

        let err = finder.find(&mut e, 0.0, 5.0, &mut record).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Evaluation(EvaluationError::NonFinite { parameter, .. }) if parameter == 2.0
        ));
        assert!(!err.is_non_convergence());
    }
}
