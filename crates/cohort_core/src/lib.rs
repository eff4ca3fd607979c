//! # cohort_core: Calibration Foundation for Cohort Simulation
//!
//! ## Layer 1 (Foundation) Role
//!
//! cohort_core is the bottom layer of the workspace and provides:
//! - The one-parameter calibration search (`math::solvers`): a bracket
//!   expansion phase followed by a bisection refinement phase
//! - The [`Evaluator`](traits::Evaluator) capability that both phases close over
//! - Calibration state, the append-only evaluation record and parameter
//!   estimates (`types::calibration`)
//! - Error types: `SolverError`, `EvaluationError`, `LinalgError` (`types::error`)
//! - Saturating transforms and a small Cholesky toolkit (`math`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other cohort_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Structured error types
//! - tracing: Per-iteration diagnostics
//! - serde: Serialisation support (optional)
//!
//! ## Usage Example
//!
//! ```rust
//! use cohort_core::math::solvers::{BisectionRefiner, BracketFinder, SolverConfig};
//! use cohort_core::traits::FnEvaluator;
//! use cohort_core::types::EvaluationRecord;
//!
//! // A monotone statistic: crosses 0.7 at parameter ln(0.7 / 0.3)
//! let mut evaluator = FnEvaluator::new(|p: f64| 1.0 / (1.0 + (-p).exp()));
//! let config = SolverConfig::new(1e-8, 100);
//! let mut record = EvaluationRecord::new();
//!
//! let bracketed = BracketFinder::new(config)
//!     .find(&mut evaluator, 0.0, 0.7, &mut record)
//!     .unwrap();
//! let refined = BisectionRefiner::new(config)
//!     .refine(&mut evaluator, bracketed, &mut record)
//!     .unwrap();
//!
//! assert!((refined.current_stat - 0.7).abs() < 1e-8);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for states, records and estimates

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod traits;
pub mod types;
