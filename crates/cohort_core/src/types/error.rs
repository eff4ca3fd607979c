//! Error types for structured error handling.
//!
//! This module provides:
//! - `EvaluationError`: Errors raised while evaluating a candidate parameter
//! - `SolverError`: Errors from the bracket and bisection search phases
//! - `LinalgError`: Errors from dense symmetric linear algebra

use thiserror::Error;

/// Errors raised by an [`Evaluator`](crate::traits::Evaluator).
///
/// # Examples
/// ```
/// use cohort_core::types::EvaluationError;
///
/// let err = EvaluationError::NonFinite { parameter: 1.0, value: f64::NAN };
/// assert!(format!("{}", err).contains("Non-finite"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationError {
    /// The evaluator produced NaN or an infinite statistic.
    #[error("Non-finite statistic {value} at parameter {parameter}")]
    NonFinite {
        /// Parameter that was evaluated
        parameter: f64,
        /// Offending statistic
        value: f64,
    },

    /// The simulation or estimation step failed.
    #[error("Evaluation failed at parameter {parameter}: {message}")]
    Failed {
        /// Parameter that was evaluated
        parameter: f64,
        /// Description of the failure
        message: String,
    },
}

impl EvaluationError {
    /// Create a failure error from any displayable cause.
    pub fn failed(parameter: f64, message: impl Into<String>) -> Self {
        EvaluationError::Failed {
            parameter,
            message: message.into(),
        }
    }
}

/// Root-finding search errors.
///
/// The two non-convergence variants carry the best information available at
/// the point the iteration cap was hit so that callers never mistake an
/// exhausted search for a converged one.
///
/// # Examples
/// ```
/// use cohort_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded {
///     iterations: 100,
///     best_param: 0.4,
///     best_stat: 0.51,
///     final_diff: 0.01,
/// };
/// assert!(format!("{}", err).contains("100 iterations"));
/// assert!(err.is_non_convergence());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Bracket expansion exhausted its iterations without crossing the target.
    #[error(
        "No crossing of target {target} found after {iterations} steps \
         (last parameter {last_param}, statistic {last_stat})"
    )]
    BracketNotFound {
        /// Number of expansion steps taken
        iterations: usize,
        /// Last parameter evaluated
        last_param: f64,
        /// Statistic at the last parameter
        last_stat: f64,
        /// Target statistic
        target: f64,
    },

    /// Bisection exhausted its iterations without reaching the tolerance.
    #[error(
        "Failed to converge after {iterations} iterations \
         (best parameter {best_param}, final diff {final_diff:.3e})"
    )]
    MaxIterationsExceeded {
        /// Number of bisection iterations performed
        iterations: usize,
        /// Parameter with the smallest distance to the target seen so far
        best_param: f64,
        /// Statistic at `best_param`
        best_stat: f64,
        /// `|statistic - target|` at the final iteration
        final_diff: f64,
    },

    /// Bisection was handed a state without bounds.
    #[error("State at parameter {param} carries no bracket")]
    Unbracketed {
        /// Current parameter of the offending state
        param: f64,
    },

    /// Solver configuration rejected.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// The evaluator failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl SolverError {
    /// True for the iteration-cap variants.
    pub fn is_non_convergence(&self) -> bool {
        matches!(
            self,
            SolverError::BracketNotFound { .. } | SolverError::MaxIterationsExceeded { .. }
        )
    }
}

/// Dense linear algebra errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// Matrix is not positive definite (pivot at `index` was not positive).
    #[error("Matrix is not positive definite (pivot {index})")]
    NotPositiveDefinite {
        /// Row of the failing pivot
        index: usize,
    },

    /// Matrix dimensions are invalid.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected element count
        expected: usize,
        /// Provided element count
        got: usize,
    },

    /// Matrix is not symmetric.
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
    },
}
