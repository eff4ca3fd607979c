//! Numerical building blocks.
//!
//! - [`solvers`]: Bracket expansion and bisection refinement over an evaluator
//! - [`numerics`]: Overflow-safe logistic and exponential transforms
//! - [`linalg`]: Symmetric matrices and Cholesky factorisation

pub mod linalg;
pub mod numerics;
pub mod solvers;
