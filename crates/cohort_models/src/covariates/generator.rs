//! Block-wise multivariate normal covariate generation.

use super::{CorrelationMatrix, CovariateError};
use crate::rng::SeededSource;
use cohort_core::math::linalg::CholeskyFactor;
use tracing::trace;

/// Default number of rows generated per block.
pub const DEFAULT_BLOCK_SIZE: usize = 1_000;

/// Observation-by-covariate table stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct CovariateTable {
    data: Vec<f64>,
    n_vars: usize,
}

impl CovariateTable {
    /// Wrap row-major data with `n_vars` columns.
    ///
    /// # Errors
    ///
    /// `RaggedRows` if `data.len()` is not a multiple of `n_vars`, or if
    /// `n_vars` is zero and `data` is non-empty.
    pub fn from_rows(data: Vec<f64>, n_vars: usize) -> Result<Self, CovariateError> {
        let ragged = if n_vars == 0 {
            !data.is_empty()
        } else {
            data.len() % n_vars != 0
        };
        if ragged {
            return Err(CovariateError::RaggedRows {
                len: data.len(),
                n_vars,
            });
        }
        Ok(Self { data, n_vars })
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        if self.n_vars == 0 {
            0
        } else {
            self.data.len() / self.n_vars
        }
    }

    /// Number of covariates.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Covariates of observation `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_vars..(i + 1) * self.n_vars]
    }

    /// Iterator over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_vars.max(1))
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows().map(|r| r[j]).collect()
    }

    /// Mean of column `j`; `None` for an empty table.
    pub fn column_mean(&self, j: usize) -> Option<f64> {
        cohort_core::math::numerics::mean(&self.column(j))
    }

    /// Row-major backing data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Multivariate normal covariate generator.
///
/// Draws `X = L * Z` per observation from a single stream, optionally
/// dichotomising the first `n_binary` columns at zero. Rows are produced in
/// blocks and concatenated. Because every block continues the same stream,
/// the table depends only on the seed and not on the block size.
///
/// # Example
///
/// ```
/// use cohort_models::covariates::{CorrelationMatrix, CovariateGenerator};
/// use cohort_models::rng::SeededSource;
///
/// let generator = CovariateGenerator::new(&CorrelationMatrix::exchangeable(3, 0.2).unwrap())
///     .unwrap()
///     .with_binary_prefix(1)
///     .unwrap();
///
/// let table = generator.generate(500, &SeededSource::new(11));
/// assert_eq!(table.n_obs(), 500);
/// assert!(table.column(0).iter().all(|&x| x == 0.0 || x == 1.0));
/// ```
#[derive(Clone, Debug)]
pub struct CovariateGenerator {
    factor: CholeskyFactor<f64>,
    n_binary: usize,
    block_size: usize,
}

impl CovariateGenerator {
    /// Create a generator for the given correlation structure.
    pub fn new(correlation: &CorrelationMatrix) -> Result<Self, CovariateError> {
        Ok(Self {
            factor: correlation.cholesky()?,
            n_binary: 0,
            block_size: DEFAULT_BLOCK_SIZE,
        })
    }

    /// Dichotomise the first `n_binary` columns (`x > 0 -> 1`, else `0`).
    pub fn with_binary_prefix(mut self, n_binary: usize) -> Result<Self, CovariateError> {
        if n_binary > self.n_vars() {
            return Err(CovariateError::TooManyBinary {
                requested: n_binary,
                available: self.n_vars(),
            });
        }
        self.n_binary = n_binary;
        Ok(self)
    }

    /// Rows generated per block.
    pub fn with_block_size(mut self, block_size: usize) -> Result<Self, CovariateError> {
        if block_size == 0 {
            return Err(CovariateError::InvalidBlockSize);
        }
        self.block_size = block_size;
        Ok(self)
    }

    /// Number of covariates per observation.
    pub fn n_vars(&self) -> usize {
        self.factor.dim()
    }

    /// Number of dichotomised leading columns.
    pub fn n_binary(&self) -> usize {
        self.n_binary
    }

    /// Generate `n_obs` rows from `source`.
    pub fn generate(&self, n_obs: usize, source: &SeededSource) -> CovariateTable {
        let p = self.n_vars();
        let mut rng = source.replay();
        let mut data = Vec::with_capacity(n_obs * p);
        let mut z = vec![0.0; p];
        let mut x = vec![0.0; p];

        let mut remaining = n_obs;
        let mut block = 0usize;
        while remaining > 0 {
            let rows = remaining.min(self.block_size);
            for _ in 0..rows {
                rng.fill_normal(&mut z);
                self.factor.transform_into(&z, &mut x);
                for value in x.iter_mut().take(self.n_binary) {
                    *value = if *value > 0.0 { 1.0 } else { 0.0 };
                }
                data.extend_from_slice(&x);
            }
            trace!(block, rows, "Covariate block generated");
            remaining -= rows;
            block += 1;
        }

        CovariateTable { data, n_vars: p }
    }
}
