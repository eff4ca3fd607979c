//! The evaluator capability.
//!
//! An evaluator wraps "simulate, fit, summarise" behind a single scalar
//! function. Implementations pin their random draws so that two calls with the
//! same parameter return the same statistic and calls with different
//! parameters differ only through the parameter.

use crate::types::EvaluationError;

/// Maps a candidate parameter to the summary statistic it induces.
///
/// Takes `&mut self` because implementations may rebuild their simulated
/// data in place; the result must nevertheless be a deterministic function of
/// `(seed, parameter, dataset)`.
///
/// # Example
///
/// ```
/// use cohort_core::traits::Evaluator;
/// use cohort_core::types::EvaluationError;
///
/// struct Shifted(f64);
///
/// impl Evaluator for Shifted {
///     fn evaluate(&mut self, parameter: f64) -> Result<f64, EvaluationError> {
///         Ok(parameter + self.0)
///     }
/// }
///
/// let mut e = Shifted(2.0);
/// assert_eq!(e.evaluate(1.0).unwrap(), 3.0);
/// ```
pub trait Evaluator {
    /// Evaluate the statistic induced by `parameter`.
    fn evaluate(&mut self, parameter: f64) -> Result<f64, EvaluationError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    #[inline]
    fn evaluate(&mut self, parameter: f64) -> Result<f64, EvaluationError> {
        (**self).evaluate(parameter)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    #[inline]
    fn evaluate(&mut self, parameter: f64) -> Result<f64, EvaluationError> {
        (**self).evaluate(parameter)
    }
}

/// Adapts an infallible closure into an [`Evaluator`].
///
/// # Example
///
/// ```
/// use cohort_core::traits::{Evaluator, FnEvaluator};
///
/// let mut e = FnEvaluator::new(|p: f64| 2.0 * p);
/// assert_eq!(e.evaluate(1.5).unwrap(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct FnEvaluator<F> {
    f: F,
}

impl<F> FnEvaluator<F>
where
    F: FnMut(f64) -> f64,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: FnMut(f64) -> f64,
{
    #[inline]
    fn evaluate(&mut self, parameter: f64) -> Result<f64, EvaluationError> {
        Ok((self.f)(parameter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_evaluator_counts_calls() {
        let mut calls = 0;
        {
            let mut e = FnEvaluator::new(|p: f64| {
                calls += 1;
                p * p
            });
            assert_eq!(e.evaluate(3.0).unwrap(), 9.0);
            assert_eq!(e.evaluate(-2.0).unwrap(), 4.0);
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_mut_ref_forwarding() {
        fn eval_once<E: Evaluator>(mut e: E) -> f64 {
            e.evaluate(1.0).unwrap()
        }

        let mut e = FnEvaluator::new(|p: f64| p + 1.0);
        assert_eq!(eval_once(&mut e), 2.0);
        assert_eq!(eval_once(&mut e), 2.0);
    }

    #[test]
    fn test_boxed_evaluator() {
        let mut boxed: Box<dyn Evaluator> = Box::new(FnEvaluator::new(|p: f64| -p));
        assert_eq!(boxed.evaluate(4.0).unwrap(), -4.0);
    }
}
