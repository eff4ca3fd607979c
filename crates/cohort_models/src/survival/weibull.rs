//! Weibull proportional hazards baseline.

use super::CoxError;
use cohort_core::math::numerics::saturating_exp;

/// Weibull baseline hazard `h0(t) = lambda * eta * t^(eta - 1)`.
///
/// With a linear predictor `x`, the hazard is `h0(t) * exp(x)` and inversion
/// of the survival function at a uniform `U` gives
///
/// ```text
/// T = (-ln U / (lambda * exp(x)))^(1 / eta)
/// ln T = (ln(-ln U) - ln lambda - x) / eta
/// ```
///
/// Simulators store `ln(-ln U)` once per observation and call
/// [`event_time`](Self::event_time) with a new linear predictor on every
/// evaluation.
///
/// # Example
///
/// ```
/// use cohort_models::survival::WeibullBaseline;
///
/// let baseline = WeibullBaseline::new(2e-5, 2.0).unwrap();
/// let u: f64 = 0.5;
/// let t = baseline.event_time((-u.ln()).ln(), 0.0);
/// assert!((t - (2.0_f64.ln() / 2e-5).sqrt()).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeibullBaseline {
    lambda: f64,
    eta: f64,
}

impl WeibullBaseline {
    /// Create a baseline with scale `lambda` and shape `eta`.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` unless both are positive and finite.
    pub fn new(lambda: f64, eta: f64) -> Result<Self, CoxError> {
        if !(lambda > 0.0 && lambda.is_finite()) {
            return Err(CoxError::InvalidParameter {
                name: "lambda",
                value: lambda,
            });
        }
        if !(eta > 0.0 && eta.is_finite()) {
            return Err(CoxError::InvalidParameter {
                name: "eta",
                value: eta,
            });
        }
        Ok(Self { lambda, eta })
    }

    /// Scale parameter.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Shape parameter.
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// `ln T` for a stored `ln(-ln U)` and linear predictor.
    #[inline]
    pub fn log_event_time(&self, log_neg_log_u: f64, linear: f64) -> f64 {
        (log_neg_log_u - self.lambda.ln() - linear) / self.eta
    }

    /// Event time, saturated to `[f64::MIN_POSITIVE, f64::MAX]`.
    #[inline]
    pub fn event_time(&self, log_neg_log_u: f64, linear: f64) -> f64 {
        saturating_exp(self.log_event_time(log_neg_log_u, linear))
    }

    /// Survival probability `S(t) = exp(-lambda * exp(x) * t^eta)`.
    pub fn survival(&self, t: f64, linear: f64) -> f64 {
        (-self.lambda * saturating_exp(linear) * t.powf(self.eta)).exp()
    }
}
