//! Covariate generation errors.

use cohort_core::types::LinalgError;
use thiserror::Error;

/// Errors for correlation matrix construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// Underlying matrix is malformed or not positive definite.
    #[error("Correlation matrix error: {0}")]
    Linalg(#[from] LinalgError),

    /// Diagonal element differs from 1.0.
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Diagonal index
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Off-diagonal correlation outside [-1, 1].
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
        /// Offending value
        value: f64,
    },
}

/// Errors for covariate tables and linear predictors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CovariateError {
    /// Correlation structure rejected.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    /// More binary columns requested than covariates exist.
    #[error("Cannot dichotomise {requested} columns of a {available}-column design")]
    TooManyBinary {
        /// Requested binary prefix length
        requested: usize,
        /// Number of covariates
        available: usize,
    },

    /// Row-major data does not divide into whole rows.
    #[error("{len} values do not form rows of {n_vars} covariates")]
    RaggedRows {
        /// Number of values supplied
        len: usize,
        /// Requested row width
        n_vars: usize,
    },

    /// Block size of zero.
    #[error("Block size must be positive")]
    InvalidBlockSize,

    /// Coefficient vector does not match the covariate width.
    #[error("Expected {expected} coefficients, got {got}")]
    CoefficientMismatch {
        /// Covariate count
        expected: usize,
        /// Coefficient count
        got: usize,
    },

    /// Coefficient is NaN or infinite.
    #[error("Coefficient {index} is not finite: {value}")]
    NonFiniteCoefficient {
        /// Coefficient index
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Dataset with no observations.
    #[error("Dataset must contain at least one observation")]
    EmptyDataset,

    /// Linear predictor entry is NaN or infinite.
    #[error("Linear predictor at row {row} is not finite: {value}")]
    NonFiniteLinearPredictor {
        /// Observation index
        row: usize,
        /// Offending value
        value: f64,
    },
}
