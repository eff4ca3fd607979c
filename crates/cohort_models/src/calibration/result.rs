//! Calibration result types.

use cohort_core::types::{EvaluationRecord, ParameterEstimate};
use std::fmt;
use std::time::Duration;

/// Why the calibration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Termination {
    /// Initial statistic equalled the target exactly.
    ExactMatch,
    /// Bisection reached the tolerance, or the bracket end point already
    /// satisfied it.
    Converged,
    /// Bracket expansion hit the iteration cap.
    BracketNotFound,
    /// Bisection hit the iteration cap.
    MaxIterationsExceeded,
}

impl Termination {
    /// True for the two successful outcomes.
    pub fn is_converged(&self) -> bool {
        matches!(self, Termination::ExactMatch | Termination::Converged)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Termination::ExactMatch => "exact match",
            Termination::Converged => "converged",
            Termination::BracketNotFound => "bracket not found",
            Termination::MaxIterationsExceeded => "max iterations exceeded",
        };
        f.write_str(s)
    }
}

/// Calibration diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationDiagnostics {
    /// Bracket expansion steps taken
    pub bracket_iterations: usize,
    /// Bisection iterations taken
    pub bisection_iterations: usize,
    /// Total evaluator calls
    pub evaluations: usize,
    /// Final bracket, if one was found
    pub bracket: Option<(f64, f64)>,
    /// `|statistic - target|` at the last evaluation
    pub final_diff: f64,
    /// Wall-clock duration
    pub duration: Duration,
    /// Stop reason
    pub termination: Termination,
}

impl CalibrationDiagnostics {
    /// Total iterations across both phases.
    pub fn total_iterations(&self) -> usize {
        self.bracket_iterations + self.bisection_iterations
    }
}

/// Calibration result.
///
/// Carries the estimate whether or not the search converged; for an
/// unconverged search the estimate is the best parameter seen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationResult {
    /// Final (or best-effort) estimate
    pub estimate: ParameterEstimate,
    /// Whether the tolerance was reached
    pub converged: bool,
    /// Search diagnostics
    pub diagnostics: CalibrationDiagnostics,
    /// One state snapshot per evaluation
    pub history: EvaluationRecord,
}

impl CalibrationResult {
    /// Create a converged result.
    pub fn success(
        estimate: ParameterEstimate,
        diagnostics: CalibrationDiagnostics,
        history: EvaluationRecord,
    ) -> Self {
        Self {
            estimate,
            converged: true,
            diagnostics,
            history,
        }
    }

    /// Create an unconverged result with a best-effort estimate.
    pub fn failure(
        estimate: ParameterEstimate,
        diagnostics: CalibrationDiagnostics,
        history: EvaluationRecord,
    ) -> Self {
        Self {
            estimate,
            converged: false,
            diagnostics,
            history,
        }
    }

    /// Calibrated parameter.
    pub fn parameter(&self) -> f64 {
        self.estimate.estimated_parameter
    }

    /// Statistic induced by [`parameter`](Self::parameter).
    pub fn statistic(&self) -> f64 {
        self.estimate.induced_statistic
    }

    /// Check if calibration was successful.
    pub fn is_success(&self) -> bool {
        self.converged
    }
}
