//! Survival models: Weibull event times and Cox regression.
//!
//! - [`WeibullBaseline`]: proportional hazards event-time generation by
//!   inversion
//! - [`CoxRegression`]: Breslow partial-likelihood fitter
//! - [`CoxError`]: shared error type

mod cox;
mod error;
mod weibull;

pub use cox::{CoxConfig, CoxData, CoxFit, CoxRegression};
pub use error::CoxError;
pub use weibull::WeibullBaseline;
