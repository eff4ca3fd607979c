//! Validated correlation matrices for covariate generation.
//!
//! ## Mathematical Background
//!
//! Given `p` independent standard normals `Z`, correlated normals with
//! correlation matrix `C` are obtained as
//!
//! ```text
//! X = L * Z,   C = L * L^T
//! ```
//!
//! ## Usage
//!
//! ```
//! use cohort_models::covariates::CorrelationMatrix;
//!
//! let corr = CorrelationMatrix::new(&[
//!     1.0, 0.3,
//!     0.3, 1.0,
//! ], 2).unwrap();
//!
//! let l = corr.cholesky().unwrap();
//! assert_eq!(l.transform(&[1.0, 0.0])[0], 1.0);
//! ```

use super::CorrelationError;
use cohort_core::math::linalg::{CholeskyFactor, SymmetricMatrix};

/// Correlation matrix with validation and Cholesky decomposition.
///
/// A correlation matrix must satisfy:
/// - Square and symmetric
/// - Diagonal elements equal to 1.0
/// - Off-diagonal elements in [-1, 1]
/// - Positive definite (checked on [`cholesky`](Self::cholesky))
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    inner: SymmetricMatrix<f64>,
}

impl CorrelationMatrix {
    /// Create a correlation matrix from `dim * dim` row-major elements.
    ///
    /// # Errors
    ///
    /// - `Linalg` for wrong element count or asymmetry
    /// - `InvalidDiagonal` if a diagonal element is not 1.0
    /// - `OutOfRange` if an off-diagonal element lies outside [-1, 1]
    pub fn new(data: &[f64], dim: usize) -> Result<Self, CorrelationError> {
        let inner = SymmetricMatrix::new(data, dim)?;
        let epsilon = 1e-10;

        for i in 0..dim {
            let diag = inner.get(i, i);
            if (diag - 1.0).abs() > epsilon {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let value = inner.get(i, j);
                if !(-1.0..=1.0).contains(&value) {
                    return Err(CorrelationError::OutOfRange { i, j, value });
                }
            }
        }

        Ok(Self { inner })
    }

    /// Identity correlation (independent covariates).
    pub fn identity(dim: usize) -> Self {
        Self {
            inner: SymmetricMatrix::identity(dim),
        }
    }

    /// Equicorrelated matrix with every off-diagonal element equal to `rho`.
    ///
    /// Positive definite for `-1 / (dim - 1) < rho < 1`.
    pub fn exchangeable(dim: usize, rho: f64) -> Result<Self, CorrelationError> {
        let mut data = vec![rho; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self::new(&data, dim)
    }

    /// Number of covariates.
    pub fn dim(&self) -> usize {
        self.inner.dim()
    }

    /// Element at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.inner.get(i, j)
    }

    /// Lower triangular factor `L` with `C = L * L^T`.
    ///
    /// # Errors
    ///
    /// `Linalg(NotPositiveDefinite)` for singular or indefinite matrices
    /// (for example two perfectly correlated columns).
    pub fn cholesky(&self) -> Result<CholeskyFactor<f64>, CorrelationError> {
        Ok(self.inner.cholesky()?)
    }
}
