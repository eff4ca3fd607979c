//! Calibration error types.

use crate::covariates::CovariateError;
use crate::survival::CoxError;
use cohort_core::types::SolverError;
use thiserror::Error;

/// Calibration error type.
///
/// Non-convergence is reported here only by
/// [`Calibrator::calibrate_or_error`](super::Calibrator::calibrate_or_error);
/// [`Calibrator::calibrate`](super::Calibrator::calibrate) returns it as an
/// unconverged [`CalibrationResult`](super::CalibrationResult) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Bisection exhausted its iteration cap.
    #[error(
        "Calibration did not converge after {iterations} iterations \
         (best parameter {best_param:.6}, statistic {best_stat:.6}, final diff {final_diff:.3e})"
    )]
    NotConverged {
        /// Bisection iterations performed
        iterations: usize,
        /// Parameter closest to the target
        best_param: f64,
        /// Statistic at `best_param`
        best_stat: f64,
        /// Distance to the target at the last iteration
        final_diff: f64,
    },

    /// No parameter step crossed the target.
    #[error(
        "No bracket found after {iterations} steps \
         (last parameter {last_param:.6}, statistic {last_stat:.6})"
    )]
    BracketNotFound {
        /// Bracket steps performed
        iterations: usize,
        /// Last parameter evaluated
        last_param: f64,
        /// Statistic at `last_param`
        last_stat: f64,
    },

    /// Target outside the statistic's attainable range.
    #[error("Invalid calibration target: {message}")]
    InvalidTarget {
        /// Description of the violation
        message: String,
    },

    /// Solver configuration or evaluation failure.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Covariate design rejected.
    #[error(transparent)]
    Covariate(#[from] CovariateError),

    /// Survival model rejected.
    #[error(transparent)]
    Cox(#[from] CoxError),
}

impl CalibrationError {
    /// Create a non-convergence error.
    pub fn not_converged(iterations: usize, best_param: f64, best_stat: f64, final_diff: f64) -> Self {
        CalibrationError::NotConverged {
            iterations,
            best_param,
            best_stat,
            final_diff,
        }
    }

    /// Create a bracket failure error.
    pub fn bracket_not_found(iterations: usize, last_param: f64, last_stat: f64) -> Self {
        CalibrationError::BracketNotFound {
            iterations,
            last_param,
            last_stat,
        }
    }

    /// Create an invalid target error.
    pub fn invalid_target(message: impl Into<String>) -> Self {
        CalibrationError::InvalidTarget {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// Recoverable errors might succeed with a larger iteration cap, a looser
    /// tolerance or a larger simulated cohort.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalibrationError::NotConverged { .. } | CalibrationError::BracketNotFound { .. }
        )
    }
}
