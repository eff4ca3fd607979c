//! Cox proportional hazards regression.
//!
//! Maximises the partial likelihood with Newton-Raphson, handling tied event
//! times with the Breslow approximation.
//!
//! ## Partial Likelihood (Breslow)
//!
//! With rows sorted by descending time and `R(t)` the risk set at `t`:
//!
//! ```text
//! l(beta) = sum over distinct event times t of
//!           [ sum_{i in D(t)} eta_i - d(t) * ln( sum_{j in R(t)} exp(eta_j) ) ]
//! ```
//!
//! where `D(t)` are the events at `t`, `d(t) = |D(t)|` and `eta = X beta`.
//!
//! ## Cost
//!
//! One fit costs `O(n log n)` for the risk-set sort plus `O(k * n * p^2)` for
//! `k` Newton iterations over `p` covariates.

use super::CoxError;
use cohort_core::math::linalg::SymmetricMatrix;
use tracing::trace;

/// Cox fitter configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoxConfig {
    /// Maximum Newton iterations.
    pub max_iterations: usize,
    /// Relative log-likelihood change treated as converged.
    pub tolerance: f64,
    /// Maximum step halvings per iteration when the likelihood decreases.
    pub max_step_halvings: usize,
}

impl Default for CoxConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-9,
            max_step_halvings: 20,
        }
    }
}

/// Borrowed survival data.
///
/// `covariates` is row-major with `n_covariates` columns.
#[derive(Clone, Copy, Debug)]
pub struct CoxData<'a> {
    times: &'a [f64],
    events: &'a [bool],
    covariates: &'a [f64],
    n_covariates: usize,
}

impl<'a> CoxData<'a> {
    /// Validate and wrap survival data.
    ///
    /// # Errors
    ///
    /// - `EmptyData` when there are no rows or no covariates
    /// - `LengthMismatch` when `events` or `covariates` disagree with `times`
    /// - `NonFiniteInput` for NaN or infinite times or covariates
    /// - `NoEvents` when every row is censored
    pub fn new(
        times: &'a [f64],
        events: &'a [bool],
        covariates: &'a [f64],
        n_covariates: usize,
    ) -> Result<Self, CoxError> {
        let n = times.len();
        if n == 0 || n_covariates == 0 {
            return Err(CoxError::EmptyData);
        }
        if events.len() != n {
            return Err(CoxError::LengthMismatch {
                field: "events",
                expected: n,
                got: events.len(),
            });
        }
        if covariates.len() != n * n_covariates {
            return Err(CoxError::LengthMismatch {
                field: "covariates",
                expected: n * n_covariates,
                got: covariates.len(),
            });
        }
        for row in 0..n {
            let x = &covariates[row * n_covariates..(row + 1) * n_covariates];
            if !times[row].is_finite() || x.iter().any(|v| !v.is_finite()) {
                return Err(CoxError::NonFiniteInput { row });
            }
        }
        if !events.iter().any(|&e| e) {
            return Err(CoxError::NoEvents);
        }

        Ok(Self {
            times,
            events,
            covariates,
            n_covariates,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false for validated data.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of covariates.
    pub fn n_covariates(&self) -> usize {
        self.n_covariates
    }

    /// Number of event rows.
    pub fn n_events(&self) -> usize {
        self.events.iter().filter(|&&e| e).count()
    }

    #[inline]
    fn row(&self, i: usize) -> &[f64] {
        &self.covariates[i * self.n_covariates..(i + 1) * self.n_covariates]
    }
}

/// Fitted Cox model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoxFit {
    /// Log hazard ratio per covariate.
    pub coefficients: Vec<f64>,
    /// Model-based standard errors from the inverse information matrix.
    pub standard_errors: Vec<f64>,
    /// Partial log-likelihood at the estimate.
    pub log_likelihood: f64,
    /// Newton iterations performed.
    pub iterations: usize,
    /// Number of event rows.
    pub n_events: usize,
}

impl CoxFit {
    /// Hazard ratios `exp(beta)`.
    pub fn hazard_ratios(&self) -> Vec<f64> {
        self.coefficients.iter().map(|b| b.exp()).collect()
    }
}

/// Log-likelihood with its first and second derivatives.
struct Derivatives {
    log_likelihood: f64,
    gradient: Vec<f64>,
    information: SymmetricMatrix<f64>,
}

/// Cox proportional hazards fitter.
///
/// # Example
///
/// ```
/// use cohort_models::survival::{CoxData, CoxRegression};
///
/// let times = [5.0, 3.0, 8.0, 1.0, 6.0, 2.0];
/// let events = [true; 6];
/// let treated = [0.0, 1.0, 0.0, 1.0, 1.0, 0.0];
///
/// let data = CoxData::new(&times, &events, &treated, 1).unwrap();
/// let fit = CoxRegression::default().fit(&data).unwrap();
/// assert_eq!(fit.coefficients.len(), 1);
/// assert!(fit.standard_errors[0] > 0.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CoxRegression {
    config: CoxConfig,
}

impl CoxRegression {
    /// Create a fitter with the given configuration.
    pub fn new(config: CoxConfig) -> Self {
        Self { config }
    }

    /// Returns the fitter configuration.
    pub fn config(&self) -> &CoxConfig {
        &self.config
    }

    /// Fit the model starting from `beta = 0`.
    ///
    /// # Errors
    ///
    /// - `Singular` if the information matrix is not positive definite
    /// - `NotConverged` if the likelihood is still moving after
    ///   `max_iterations`
    pub fn fit(&self, data: &CoxData<'_>) -> Result<CoxFit, CoxError> {
        let order = descending_order(data.times);
        let p = data.n_covariates;

        let mut beta = vec![0.0; p];
        let mut current = derivatives(data, &order, &beta);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let factor = current.information.cholesky()?;
            let delta = factor.solve(&current.gradient);

            let mut scale = 1.0;
            let mut halvings = 0;
            let (candidate, next) = loop {
                let candidate: Vec<f64> = beta
                    .iter()
                    .zip(&delta)
                    .map(|(b, d)| b + scale * d)
                    .collect();
                let next = derivatives(data, &order, &candidate);
                let improved = next.log_likelihood.is_finite()
                    && next.log_likelihood
                        >= current.log_likelihood - 1e-12 * current.log_likelihood.abs();
                if improved || halvings >= self.config.max_step_halvings {
                    break (candidate, next);
                }
                scale *= 0.5;
                halvings += 1;
            };

            if !next.log_likelihood.is_finite()
                || next.log_likelihood < current.log_likelihood
            {
                // No improving step exists; the current estimate is the maximum
                // to working precision.
                converged = true;
                break;
            }

            let change = (next.log_likelihood - current.log_likelihood).abs();
            let scale_ll = next.log_likelihood.abs().max(1.0);
            trace!(
                iteration = iterations,
                log_likelihood = next.log_likelihood,
                halvings,
                "Cox Newton step"
            );

            beta = candidate;
            current = next;

            if change <= self.config.tolerance * scale_ll {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(CoxError::NotConverged { iterations });
        }

        let factor = current.information.cholesky()?;
        let standard_errors = factor
            .inverse_diagonal()
            .into_iter()
            .map(|v| v.max(0.0).sqrt())
            .collect();

        Ok(CoxFit {
            coefficients: beta,
            standard_errors,
            log_likelihood: current.log_likelihood,
            iterations,
            n_events: data.n_events(),
        })
    }

    /// Breslow partial log-likelihood at `beta`.
    ///
    /// # Panics
    ///
    /// Panics if `beta.len() != data.n_covariates()`.
    pub fn log_likelihood(&self, data: &CoxData<'_>, beta: &[f64]) -> f64 {
        assert_eq!(beta.len(), data.n_covariates, "Coefficient length mismatch");
        let order = descending_order(data.times);
        derivatives(data, &order, beta).log_likelihood
    }
}

/// Row indices sorted by descending time.
fn descending_order(times: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_unstable_by(|&a, &b| times[b].total_cmp(&times[a]));
    order
}

/// Log-likelihood, score and information in one pass over the risk sets.
fn derivatives(data: &CoxData<'_>, order: &[usize], beta: &[f64]) -> Derivatives {
    let p = data.n_covariates;
    let n = order.len();

    let eta: Vec<f64> = (0..data.len())
        .map(|i| data.row(i).iter().zip(beta).map(|(x, b)| x * b).sum())
        .collect();
    // Offset keeps exp() in range; cancels in every ratio below.
    let offset = eta.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut log_likelihood = 0.0;
    let mut gradient = vec![0.0; p];
    let mut information = SymmetricMatrix::zeros(p);

    let mut s0 = 0.0;
    let mut s1 = vec![0.0; p];
    let mut s2 = vec![0.0; p * p];

    let mut start = 0;
    while start < n {
        let t = data.times[order[start]];
        let mut end = start;
        while end < n && data.times[order[end]] == t {
            end += 1;
        }

        // Everyone tied at t joins the risk set before the events at t.
        let mut deaths = 0usize;
        for &i in &order[start..end] {
            let x = data.row(i);
            let w = (eta[i] - offset).exp();
            s0 += w;
            for a in 0..p {
                s1[a] += w * x[a];
                for b in 0..=a {
                    s2[a * p + b] += w * x[a] * x[b];
                }
            }
            if data.events[i] {
                deaths += 1;
                log_likelihood += eta[i];
                for a in 0..p {
                    gradient[a] += x[a];
                }
            }
        }

        if deaths > 0 {
            let d = deaths as f64;
            log_likelihood -= d * (s0.ln() + offset);
            for a in 0..p {
                let mean_a = s1[a] / s0;
                gradient[a] -= d * mean_a;
                for b in 0..=a {
                    let mean_b = s1[b] / s0;
                    information.add_symmetric(a, b, d * (s2[a * p + b] / s0 - mean_a * mean_b));
                }
            }
        }

        start = end;
    }

    Derivatives {
        log_likelihood,
        gradient,
        information,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;
    use approx::assert_relative_eq;

    /// Exponential two-arm data with true log hazard ratio `beta`.
    fn two_arm(n_per_arm: usize, beta: f64, seed: u64) -> (Vec<f64>, Vec<bool>, Vec<f64>) {
        let mut rng = SimRng::from_seed(seed);
        let mut times = Vec::with_capacity(2 * n_per_arm);
        let mut z = Vec::with_capacity(2 * n_per_arm);
        for arm in 0..2 {
            let rate = (beta * arm as f64).exp();
            for _ in 0..n_per_arm {
                times.push(-rng.gen_open_uniform().ln() / rate);
                z.push(arm as f64);
            }
        }
        let events = vec![true; times.len()];
        (times, events, z)
    }

    #[test]
    fn test_recovers_log_hazard_ratio() {
        let (times, events, z) = two_arm(5_000, 2.0_f64.ln(), 21);
        let data = CoxData::new(&times, &events, &z, 1).unwrap();
        let fit = CoxRegression::default().fit(&data).unwrap();

        assert!((fit.coefficients[0] - 2.0_f64.ln()).abs() < 0.1);
        // Two arms of 5000 events each: se close to sqrt(1/5000 + 1/5000)
        assert!((fit.standard_errors[0] - 0.02).abs() < 0.005);
        assert_eq!(fit.n_events, 10_000);
        assert!(fit.iterations <= 10);
    }

    #[test]
    fn test_score_vanishes_at_estimate() {
        let times = [2.0, 2.0, 3.0, 1.0, 4.0, 4.0, 5.0, 0.5];
        let events = [true, true, false, true, true, true, true, true];
        let x = [
            1.0, 0.3, 0.0, -1.2, 1.0, 0.8, 0.0, 0.1, 1.0, -0.4, 0.0, 1.5, 1.0, 2.0, 0.0, -0.7,
        ];
        let data = CoxData::new(&times, &events, &x, 2).unwrap();
        let cox = CoxRegression::default();
        let fit = cox.fit(&data).unwrap();

        let h = 1e-5;
        for k in 0..2 {
            let mut up = fit.coefficients.clone();
            let mut down = fit.coefficients.clone();
            up[k] += h;
            down[k] -= h;
            let score = (cox.log_likelihood(&data, &up) - cox.log_likelihood(&data, &down)) / (2.0 * h);
            assert!(score.abs() < 1e-4, "score {} at coefficient {}", score, k);
        }
        assert_relative_eq!(
            cox.log_likelihood(&data, &fit.coefficients),
            fit.log_likelihood,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_breslow_ties_by_hand() {
        // Two tied events at t = 1 with risk set of all three rows, then one
        // event at t = 2. At beta = 0:
        // l = -2 ln 3 - ln 1
        let times = [1.0, 1.0, 2.0];
        let events = [true, true, true];
        let x = [1.0, 0.0, 0.0];
        let data = CoxData::new(&times, &events, &x, 1).unwrap();
        let ll = CoxRegression::default().log_likelihood(&data, &[0.0]);
        assert_relative_eq!(ll, -2.0 * 3.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_time_scale_invariance() {
        let (times, events, z) = two_arm(500, 0.5, 4);
        let scaled: Vec<f64> = times.iter().map(|t| t * 37.0).collect();
        let cox = CoxRegression::default();
        let a = cox.fit(&CoxData::new(&times, &events, &z, 1).unwrap()).unwrap();
        let b = cox.fit(&CoxData::new(&scaled, &events, &z, 1).unwrap()).unwrap();
        assert_relative_eq!(a.coefficients[0], b.coefficients[0], epsilon = 1e-12);
    }

    #[test]
    fn test_censoring_is_respected() {
        let (times, mut events, z) = two_arm(2_000, 0.0, 6);
        for (i, e) in events.iter_mut().enumerate() {
            *e = i % 3 != 0;
        }
        let data = CoxData::new(&times, &events, &z, 1).unwrap();
        let fit = CoxRegression::default().fit(&data).unwrap();
        assert_eq!(fit.n_events, data.n_events());
        assert!(fit.coefficients[0].abs() < 0.15);
    }

    #[test]
    fn test_constant_covariate_is_singular() {
        let times = [1.0, 2.0, 3.0];
        let events = [true, true, true];
        let x = [1.0, 1.0, 1.0];
        let data = CoxData::new(&times, &events, &x, 1).unwrap();
        assert!(matches!(
            CoxRegression::default().fit(&data),
            Err(CoxError::Singular(_))
        ));
    }

    #[test]
    fn test_validation() {
        let times = [1.0, 2.0];
        assert_eq!(
            CoxData::new(&[], &[], &[], 1).unwrap_err(),
            CoxError::EmptyData
        );
        assert!(matches!(
            CoxData::new(&times, &[true], &[0.0, 1.0], 1),
            Err(CoxError::LengthMismatch { field: "events", .. })
        ));
        assert!(matches!(
            CoxData::new(&times, &[true, true], &[0.0], 1),
            Err(CoxError::LengthMismatch { field: "covariates", .. })
        ));
        assert_eq!(
            CoxData::new(&times, &[false, false], &[0.0, 1.0], 1).unwrap_err(),
            CoxError::NoEvents
        );
        assert_eq!(
            CoxData::new(&[1.0, f64::NAN], &[true, true], &[0.0, 1.0], 1).unwrap_err(),
            CoxError::NonFiniteInput { row: 1 }
        );
    }

    #[test]
    fn test_hazard_ratios() {
        let fit = CoxFit {
            coefficients: vec![0.0, 2.0_f64.ln()],
            standard_errors: vec![0.1, 0.1],
            log_likelihood: -10.0,
            iterations: 3,
            n_events: 5,
        };
        let hr = fit.hazard_ratios();
        assert_relative_eq!(hr[0], 1.0);
        assert_relative_eq!(hr[1], 2.0, epsilon = 1e-12);
    }
}
