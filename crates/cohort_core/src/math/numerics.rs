//! Overflow-safe scalar transforms.
//!
//! Linear predictors in simulation studies are unbounded, so every transform
//! here saturates to its limit instead of producing NaN or infinity for finite
//! input.

/// Logistic function `1 / (1 + exp(-x))`, saturating to 0 and 1.
///
/// Evaluates `exp` only on non-positive arguments, so it cannot overflow.
/// NaN input is returned unchanged.
///
/// # Examples
///
/// ```
/// use cohort_core::math::numerics::logistic;
///
/// assert_eq!(logistic(0.0), 0.5);
/// assert_eq!(logistic(1e6), 1.0);
/// assert_eq!(logistic(-1e6), 0.0);
/// ```
#[inline]
pub fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse of [`logistic`] for `p` in (0, 1).
///
/// Returns `-inf` and `+inf` at the closed ends. `logit(target)` is the
/// intercept that hits a target prevalence when the linear predictor is zero.
#[inline]
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// `exp(x)` clamped to `[f64::MIN_POSITIVE, f64::MAX]`.
///
/// Keeps strictly positive quantities (hazards, event times) finite and
/// non-zero so that their ordering survives later arithmetic.
///
/// # Examples
///
/// ```
/// use cohort_core::math::numerics::saturating_exp;
///
/// assert_eq!(saturating_exp(1000.0), f64::MAX);
/// assert_eq!(saturating_exp(-1000.0), f64::MIN_POSITIVE);
/// ```
#[inline]
pub fn saturating_exp(x: f64) -> f64 {
    x.exp().clamp(f64::MIN_POSITIVE, f64::MAX)
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
