//! Core types for the calibration engine.
//!
//! - [`CalibrationState`]: Mutable search state shared by both search phases
//! - [`EvaluationRecord`]: Append-only audit trail of state snapshots
//! - [`ParameterEstimate`]: Final estimate handed to downstream consumers
//! - Error types: [`SolverError`], [`EvaluationError`], [`LinalgError`]

pub mod calibration;
pub mod error;

pub use calibration::{CalibrationState, EvaluationRecord, ParameterEstimate, RecordEntry, SearchPhase};
pub use error::{EvaluationError, LinalgError, SolverError};
