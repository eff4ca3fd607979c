//! One-parameter calibration search over a stochastic evaluator.
//!
//! The search drives `evaluator(parameter)` to a target statistic in two
//! phases that share a [`CalibrationState`]:
//!
//! - [`BracketFinder`]: steps the parameter by a fixed increment, in the
//!   direction given by the sign of the initial error, until the statistic
//!   crosses the target
//! - [`BisectionRefiner`]: halves the bracket, letting the evaluated statistic
//!   decide which bound moves, until `|statistic - target| < tolerance`
//!
//! Both phases assume the evaluator is monotone increasing in the parameter
//! and are bounded by [`SolverConfig::max_iterations`].
//!
//! ## Known limitation
//!
//! A finite-sample evaluator is only approximately monotone. Near the root,
//! noise can dominate the signal and produce an early crossing or a bound
//! update in the wrong direction. This is accepted; the search does not try
//! to detect it.
//!
//! ## Example
//!
//! ```
//! use cohort_core::math::solvers::{BisectionRefiner, BracketFinder, SolverConfig};
//! use cohort_core::traits::FnEvaluator;
//! use cohort_core::types::{EvaluationRecord, SearchPhase};
//!
//! let config = SolverConfig::new(1e-9, 100);
//! let mut evaluator = FnEvaluator::new(|p: f64| p * p * p);
//! let mut record = EvaluationRecord::new();
//!
//! let state = BracketFinder::new(config)
//!     .find(&mut evaluator, 0.0, -5.0, &mut record)
//!     .unwrap();
//! assert_eq!(state.bracket(), Some((-2.0, -1.0)));
//!
//! let state = BisectionRefiner::new(config)
//!     .refine(&mut evaluator, state, &mut record)
//!     .unwrap();
//! assert!((state.current_param + 5.0_f64.cbrt()).abs() < 1e-8);
//! assert_eq!(record.count(SearchPhase::Bracket), 2);
//! ```
//!
//! [`CalibrationState`]: crate::types::CalibrationState

mod bisection;
mod bracket;
mod config;

pub use bisection::BisectionRefiner;
pub use bracket::{BracketFinder, DEFAULT_BRACKET_STEP};
pub use config::SolverConfig;

use crate::traits::Evaluator;
use crate::types::{EvaluationError, SolverError};

/// Evaluate and reject non-finite statistics.
fn evaluate_finite<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    parameter: f64,
) -> Result<f64, SolverError> {
    let value = evaluator.evaluate(parameter)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFinite { parameter, value }.into())
    }
}
