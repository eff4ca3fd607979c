//! # Cohort Models (L2: Simulation and Estimation)
//!
//! Synthetic patient cohorts with controlled effects, and the calibration
//! runs that pin those effects down.
//!
//! This crate provides:
//! - A replayable seeded random source (`rng`)
//! - Correlated covariate generation with dichotomised columns (`covariates`)
//! - Weibull event times and Cox proportional-hazards regression (`survival`)
//! - The prevalence and marginal hazard ratio evaluators (`evaluators`)
//! - The two-phase calibrator with diagnostics and ready-made runs (`calibration`)
//!
//! ## Design Principles
//!
//! - **Pinned randomness**: every evaluator redraws the identical random
//!   numbers on every call, so only the calibrated parameter changes
//! - **Explicit configuration**: seeds and tolerances travel with each run;
//!   nothing is process-global
//! - **Sequential**: each evaluation is a blocking, deterministic computation

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod covariates;
pub mod evaluators;
pub mod rng;
pub mod survival;
