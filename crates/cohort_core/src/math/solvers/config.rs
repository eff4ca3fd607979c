//! Solver configuration types.

use crate::types::SolverError;

/// Configuration shared by the bracket and bisection phases.
///
/// # Example
///
/// ```
/// use cohort_core::math::solvers::SolverConfig;
///
/// // Use default configuration
/// let config = SolverConfig::default();
/// assert!(config.tolerance <= 1e-5);
/// assert_eq!(config.max_iterations, 100);
///
/// // Custom configuration
/// let custom = SolverConfig {
///     tolerance: 1e-4,
///     max_iterations: 30,
/// };
/// assert!(custom.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Convergence tolerance on the statistic.
    ///
    /// Bisection stops when `|statistic - target| < tolerance`.
    pub tolerance: f64,

    /// Iteration cap applied to each phase separately.
    ///
    /// The bracket phase evaluates at most `max_iterations + 1` times
    /// (initial point plus one per step); the bisection phase at most
    /// `max_iterations` times.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    /// Default values:
    /// - `tolerance`: 1e-5
    /// - `max_iterations`: 100
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with specified values.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use cohort_core::math::solvers::SolverConfig;
    ///
    /// let config = SolverConfig::new(1e-6, 200);
    /// assert_eq!(config.max_iterations, 200);
    /// ```
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        assert!(tolerance > 0.0, "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Fallible counterpart of [`SolverConfig::new`] for user-supplied values.
    pub fn try_new(tolerance: f64, max_iterations: usize) -> Result<Self, SolverError> {
        let config = Self {
            tolerance,
            max_iterations,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(SolverError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
