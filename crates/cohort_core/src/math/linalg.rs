//! Dense symmetric matrices and Cholesky factorisation.
//!
//! Sized for the small systems this workspace needs: covariate correlation
//! matrices and Cox information matrices, both a handful of rows wide.
//!
//! ## Mathematical Background
//!
//! A symmetric positive definite matrix `A` factors as `A = L * L^T` with `L`
//! lower triangular. The factor serves two purposes:
//!
//! - correlating independent normals: `W = L * Z`
//! - solving `A x = b` by forward then backward substitution
//!
//! ## Usage
//!
//! ```
//! use cohort_core::math::linalg::SymmetricMatrix;
//!
//! let a = SymmetricMatrix::new(&[4.0_f64, 2.0, 2.0, 3.0], 2).unwrap();
//! let l = a.cholesky().unwrap();
//!
//! let x = l.solve(&[2.0, 1.0]);
//! assert!((4.0 * x[0] + 2.0 * x[1] - 2.0).abs() < 1e-12);
//! assert!((2.0 * x[0] + 3.0 * x[1] - 1.0).abs() < 1e-12);
//! ```

use crate::types::LinalgError;
use num_traits::Float;

/// Square symmetric matrix stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetricMatrix<T: Float> {
    data: Vec<T>,
    dim: usize,
}

impl<T: Float> SymmetricMatrix<T> {
    /// Create a matrix from `dim * dim` row-major elements.
    ///
    /// # Errors
    ///
    /// - `InvalidDimensions` if `data.len() != dim * dim`
    /// - `NotSymmetric` if any `(i, j)` and `(j, i)` differ by more than 1e-10
    pub fn new(data: &[T], dim: usize) -> Result<Self, LinalgError> {
        let expected = dim * dim;
        if data.len() != expected {
            return Err(LinalgError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        let epsilon = T::from(1e-10).unwrap_or_else(T::epsilon);
        for i in 0..dim {
            for j in (i + 1)..dim {
                if (data[i * dim + j] - data[j * dim + i]).abs() > epsilon {
                    return Err(LinalgError::NotSymmetric { i, j });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Create a zero matrix, used as an accumulator.
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![T::zero(); dim * dim],
            dim,
        }
    }

    /// Create an identity matrix.
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            m.data[i * dim + i] = T::one();
        }
        m
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.dim + j]
    }

    /// Add `value` at `(i, j)` and, off the diagonal, at `(j, i)`.
    pub fn add_symmetric(&mut self, i: usize, j: usize, value: T) {
        let n = self.dim;
        self.data[i * n + j] = self.data[i * n + j] + value;
        if i != j {
            self.data[j * n + i] = self.data[j * n + i] + value;
        }
    }

    /// Compute the lower triangular factor `L` with `A = L * L^T`.
    ///
    /// # Errors
    ///
    /// `NotPositiveDefinite` when a pivot is not strictly positive.
    pub fn cholesky(&self) -> Result<CholeskyFactor<T>, LinalgError> {
        let n = self.dim;
        let mut lower = vec![T::zero(); n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = T::zero();
                for k in 0..j {
                    sum = sum + lower[i * n + k] * lower[j * n + k];
                }

                if i == j {
                    let diag = self.get(i, i) - sum;
                    if diag <= T::zero() || !diag.is_finite() {
                        return Err(LinalgError::NotPositiveDefinite { index: i });
                    }
                    lower[i * n + i] = diag.sqrt();
                } else {
                    lower[i * n + j] = (self.get(i, j) - sum) / lower[j * n + j];
                }
            }
        }

        Ok(CholeskyFactor { data: lower, dim: n })
    }
}

/// Lower triangular Cholesky factor.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor<T: Float> {
    data: Vec<T>,
    dim: usize,
}

impl<T: Float> CholeskyFactor<T> {
    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at `(i, j)`; zero above the diagonal.
    pub fn get(&self, i: usize, j: usize) -> T {
        if j > i {
            T::zero()
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Compute `L * z` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if either slice is shorter than `self.dim()`.
    pub fn transform_into(&self, z: &[T], out: &mut [T]) {
        let n = self.dim;
        assert!(
            z.len() >= n && out.len() >= n,
            "Input length {} / output length {} is less than matrix dimension {}",
            z.len(),
            out.len(),
            n
        );

        for i in 0..n {
            let mut sum = T::zero();
            for j in 0..=i {
                sum = sum + self.data[i * n + j] * z[j];
            }
            out[i] = sum;
        }
    }

    /// Compute `L * z`.
    pub fn transform(&self, z: &[T]) -> Vec<T> {
        let mut out = vec![T::zero(); self.dim];
        self.transform_into(z, &mut out);
        out
    }

    /// Solve `A x = b` where `A = L * L^T`.
    ///
    /// # Panics
    ///
    /// Panics if `b.len() != self.dim()`.
    pub fn solve(&self, b: &[T]) -> Vec<T> {
        let n = self.dim;
        assert_eq!(b.len(), n, "Right-hand side length must equal dimension");

        // Forward: L y = b
        let mut y = vec![T::zero(); n];
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum = sum - self.data[i * n + k] * y[k];
            }
            y[i] = sum / self.data[i * n + i];
        }

        // Backward: L^T x = y
        let mut x = vec![T::zero(); n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for k in (i + 1)..n {
                sum = sum - self.data[k * n + i] * x[k];
            }
            x[i] = sum / self.data[i * n + i];
        }
        x
    }

    /// Diagonal of `A^{-1}`, column by column.
    pub fn inverse_diagonal(&self) -> Vec<T> {
        let n = self.dim;
        let mut e = vec![T::zero(); n];
        (0..n)
            .map(|i| {
                e.iter_mut().for_each(|v| *v = T::zero());
                e[i] = T::one();
                self.solve(&e)[i]
            })
            .collect()
    }
}
