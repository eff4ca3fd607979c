//! Calibration state, evaluation record and parameter estimates.

use std::fmt;

/// Search phase that produced a record entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SearchPhase {
    /// Evaluation at the initial parameter.
    Initial,
    /// Fixed-step bracket expansion.
    Bracket,
    /// Bisection refinement.
    Bisection,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPhase::Initial => write!(f, "initial"),
            SearchPhase::Bracket => write!(f, "bracket"),
            SearchPhase::Bisection => write!(f, "bisection"),
        }
    }
}

/// Search state shared by the bracket and bisection phases.
///
/// Created at iteration 0 from the initial evaluation, advanced once per
/// iteration by [`BracketFinder`](crate::math::solvers::BracketFinder) and
/// then handed to [`BisectionRefiner`](crate::math::solvers::BisectionRefiner),
/// which restarts the iteration counter.
///
/// Once both bounds are set, `lower_bound <= root <= upper_bound` holds as
/// long as the evaluator is monotone over the explored range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationState {
    /// Iteration counter within the current phase
    pub iteration: usize,
    /// Parameter most recently evaluated
    pub current_param: f64,
    /// Statistic induced by `current_param`
    pub current_stat: f64,
    /// Statistic the search is driving towards
    pub target_stat: f64,
    /// Lower end of the bracket, once known
    pub lower_bound: Option<f64>,
    /// Upper end of the bracket, once known
    pub upper_bound: Option<f64>,
    /// Whether the owning phase has terminated
    pub stopped: bool,
}

impl CalibrationState {
    /// Create an iteration-0 state from an initial evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// use cohort_core::types::CalibrationState;
    ///
    /// let state = CalibrationState::new(0.0, 0.4, 0.5);
    /// assert_eq!(state.iteration, 0);
    /// assert!(state.bracket().is_none());
    /// assert!((state.diff() - 0.1).abs() < 1e-12);
    /// ```
    pub fn new(param: f64, stat: f64, target: f64) -> Self {
        Self {
            iteration: 0,
            current_param: param,
            current_stat: stat,
            target_stat: target,
            lower_bound: None,
            upper_bound: None,
            stopped: false,
        }
    }

    /// Absolute distance between the current statistic and the target.
    #[inline]
    pub fn diff(&self) -> f64 {
        (self.current_stat - self.target_stat).abs()
    }

    /// The bracket `(lo, hi)` when both bounds are known.
    pub fn bracket(&self) -> Option<(f64, f64)> {
        match (self.lower_bound, self.upper_bound) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        }
    }

    /// True for the `[p, p]` bracket produced by an exact initial match.
    pub fn is_degenerate(&self) -> bool {
        matches!(self.bracket(), Some((lo, hi)) if lo == hi)
    }

    /// Extract the parameter estimate carried by this state.
    pub fn estimate(&self) -> ParameterEstimate {
        ParameterEstimate {
            estimated_parameter: self.current_param,
            induced_statistic: self.current_stat,
            target_statistic: self.target_stat,
        }
    }
}

/// Final calibrated parameter and the statistic it induces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterEstimate {
    /// Calibrated parameter value
    pub estimated_parameter: f64,
    /// Statistic induced by the calibrated parameter
    pub induced_statistic: f64,
    /// Statistic the calibration was aiming for
    pub target_statistic: f64,
}

impl ParameterEstimate {
    /// Absolute distance between induced and target statistics.
    pub fn diff(&self) -> f64 {
        (self.induced_statistic - self.target_statistic).abs()
    }
}

/// One snapshot in an [`EvaluationRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordEntry {
    /// Phase that produced the snapshot
    pub phase: SearchPhase,
    /// State immediately after the evaluation
    pub state: CalibrationState,
}

/// Append-only history of calibration states, one entry per evaluation.
///
/// Used for diagnostics only; the search never reads it back.
///
/// # Examples
///
/// ```
/// use cohort_core::types::{CalibrationState, EvaluationRecord, SearchPhase};
///
/// let mut record = EvaluationRecord::new();
/// record.push(SearchPhase::Initial, &CalibrationState::new(0.0, 0.3, 0.5));
/// assert_eq!(record.len(), 1);
/// assert_eq!(record.count(SearchPhase::Bisection), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationRecord {
    entries: Vec<RecordEntry>,
}

impl EvaluationRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot of `state`.
    pub fn push(&mut self, phase: SearchPhase, state: &CalibrationState) {
        self.entries.push(RecordEntry {
            phase,
            state: *state,
        });
    }

    /// Number of snapshots, equal to the number of evaluations performed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of snapshots produced by `phase`.
    pub fn count(&self, phase: SearchPhase) -> usize {
        self.entries.iter().filter(|e| e.phase == phase).count()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&RecordEntry> {
        self.entries.last()
    }

    /// All snapshots in evaluation order.
    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// Iterate over snapshots in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, RecordEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a EvaluationRecord {
    type Item = &'a RecordEntry;
    type IntoIter = std::slice::Iter<'a, RecordEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_bracket_requires_both_bounds() {
        let mut state = CalibrationState::new(1.0, 0.2, 0.5);
        state.lower_bound = Some(0.0);
        assert!(state.bracket().is_none());
        state.upper_bound = Some(1.0);
        assert_eq!(state.bracket(), Some((0.0, 1.0)));
        assert!(!state.is_degenerate());
    }

    #[test]
    fn test_degenerate_bracket() {
        let mut state = CalibrationState::new(0.3, 0.5, 0.5);
        state.lower_bound = Some(0.3);
        state.upper_bound = Some(0.3);
        assert!(state.is_degenerate());
        assert_eq!(state.diff(), 0.0);
    }

    #[test]
    fn test_estimate_from_state() {
        let state = CalibrationState::new(-1.2, 0.31, 0.3);
        let est = state.estimate();
        assert_eq!(est.estimated_parameter, -1.2);
        assert!((est.diff() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_record_is_ordered() {
        let mut record = EvaluationRecord::new();
        let mut state = CalibrationState::new(0.0, 0.1, 0.5);
        record.push(SearchPhase::Initial, &state);
        state.iteration = 1;
        state.current_param = 1.0;
        record.push(SearchPhase::Bracket, &state);

        let params: Vec<f64> = record.iter().map(|e| e.state.current_param).collect();
        assert_eq!(params, vec![0.0, 1.0]);
        assert_eq!(record.count(SearchPhase::Bracket), 1);
        assert_eq!(record.last().map(|e| e.phase), Some(SearchPhase::Bracket));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(SearchPhase::Bisection.to_string(), "bisection");
    }
}
