//! CLI error types

use crate::config::ConfigError;
use cohort_models::calibration::{CalibrationError, Termination};
use cohort_models::covariates::CovariateError;
use cohort_models::survival::CoxError;
use thiserror::Error;

/// Errors surfaced by `cohort-sim`
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Covariate design error: {0}")]
    Covariate(#[from] CovariateError),

    #[error("Survival model error: {0}")]
    Survival(#[from] CoxError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("{calibration} calibration did not converge ({termination})")]
    NotConverged {
        calibration: &'static str,
        termination: Termination,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
