//! Synthetic covariates for simulated cohorts.
//!
//! - [`CorrelationMatrix`]: validated correlation structure
//! - [`CovariateGenerator`]: block-wise multivariate normal draws with an
//!   optional dichotomised prefix
//! - [`CovariateTable`]: the generated observation-by-covariate table
//! - [`LinearPredictor`]: fixed coefficients mapping rows to `lp_i`

mod correlation;
mod error;
mod generator;
mod predictor;

pub use correlation::CorrelationMatrix;
pub use error::{CorrelationError, CovariateError};
pub use generator::{CovariateGenerator, CovariateTable, DEFAULT_BLOCK_SIZE};
pub use predictor::LinearPredictor;
