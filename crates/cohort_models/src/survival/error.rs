//! Survival model errors.

use cohort_core::types::LinalgError;
use thiserror::Error;

/// Errors from Weibull event-time generation and Cox regression.
///
/// # Examples
/// ```
/// use cohort_models::survival::CoxError;
///
/// let err = CoxError::NotConverged { iterations: 25 };
/// assert!(format!("{}", err).contains("25"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoxError {
    /// Model parameter outside its domain.
    #[error("Invalid parameter {name} = {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// No rows supplied.
    #[error("Cox regression requires at least one row")]
    EmptyData,

    /// Input slices disagree in length.
    #[error("Length mismatch for {field}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Field whose length is wrong
        field: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// No row is an event, so the partial likelihood is constant.
    #[error("No events in data")]
    NoEvents,

    /// NaN or infinite time or covariate.
    #[error("Non-finite input at row {row}")]
    NonFiniteInput {
        /// Offending row
        row: usize,
    },

    /// Information matrix not positive definite (for example a constant
    /// covariate or complete separation).
    #[error("Singular information matrix: {0}")]
    Singular(#[from] LinalgError),

    /// Newton iterations exhausted.
    #[error("Cox regression did not converge in {iterations} iterations")]
    NotConverged {
        /// Iterations performed
        iterations: usize,
    },
}
