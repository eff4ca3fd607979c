//! Calibration of simulation parameters against target statistics.
//!
//! - [`Calibrator`]: bracket expansion followed by bisection, with timing and
//!   diagnostics
//! - [`CalibrationConfig`]: target, tolerance and iteration cap for one run
//! - [`CalibrationResult`] / [`CalibrationDiagnostics`]: estimate, convergence
//!   flag, stop reason and full evaluation history
//! - [`CalibrationError`]: typed failures
//! - [`PrevalenceCalibration`] / [`HazardRatioCalibration`]: the two
//!   simulation scenarios
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Calibration Flow                        │
//! │                                                              │
//! │  Seed → CohortDesign → Evaluator → Calibrator → Result       │
//! │           │               │            │           │         │
//! │           ▼               ▼            ▼           ▼         │
//! │       Covariates    simulate + fit   Bracket   Estimate      │
//! │       lp_i          statistic        Bisection + History     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod calibrator;
mod config;
mod error;
mod result;
mod scenarios;

pub use calibrator::Calibrator;
pub use config::CalibrationConfig;
pub use error::CalibrationError;
pub use result::{CalibrationDiagnostics, CalibrationResult, Termination};
pub use scenarios::{
    HazardRatioCalibration, PrevalenceCalibration, COVARIATE_STREAM, DEFAULT_SEED, OUTCOME_STREAM,
};
