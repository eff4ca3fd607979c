//! Property tests for the two-phase calibration search.
//!
//! Uses smooth strictly increasing evaluators so that every property holds
//! exactly, independent of simulation noise.

use cohort_core::math::solvers::{BisectionRefiner, BracketFinder, SolverConfig};
use cohort_core::traits::{Evaluator, FnEvaluator};
use cohort_core::types::{EvaluationRecord, SearchPhase, SolverError};
use proptest::prelude::*;

/// Monotone evaluator `a * tanh(p - c) + b * p`.
fn monotone(a: f64, b: f64, c: f64) -> impl FnMut(f64) -> f64 + Clone {
    move |p: f64| a * (p - c).tanh() + b * p
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_bracket_straddles_target(
        a in 0.1f64..3.0,
        b in 0.05f64..1.0,
        c in -4.0f64..4.0,
        target in -5.0f64..5.0,
        start in -3.0f64..3.0,
    ) {
        let f = monotone(a, b, c);
        let mut evaluator = FnEvaluator::new(f.clone());
        let mut record = EvaluationRecord::new();

        let state = BracketFinder::new(SolverConfig::new(1e-8, 200))
            .find(&mut evaluator, start, target, &mut record)
            .unwrap();

        let (lo, hi) = state.bracket().unwrap();
        prop_assert!(lo <= hi);
        let mut check = FnEvaluator::new(f);
        let (f_lo, f_hi) = (check.evaluate(lo).unwrap(), check.evaluate(hi).unwrap());
        prop_assert!(f_lo <= target && target <= f_hi);
        prop_assert!(state.current_param == lo || state.current_param == hi);
        prop_assert_eq!(record.len(), state.iteration + 1);
    }

    #[test]
    fn prop_refined_statistic_within_tolerance(
        a in 0.1f64..3.0,
        b in 0.05f64..1.0,
        c in -4.0f64..4.0,
        target in -5.0f64..5.0,
    ) {
        let tolerance = 1e-7;
        let config = SolverConfig::new(tolerance, 200);
        let f = monotone(a, b, c);
        let mut evaluator = FnEvaluator::new(f.clone());
        let mut record = EvaluationRecord::new();

        let bracketed = BracketFinder::new(config)
            .find(&mut evaluator, 0.0, target, &mut record)
            .unwrap();
        let refined = BisectionRefiner::new(config)
            .refine(&mut evaluator, bracketed, &mut record)
            .unwrap();

        let mut check = FnEvaluator::new(f);
        let induced = check.evaluate(refined.current_param).unwrap();
        prop_assert!((induced - target).abs() < tolerance);
        prop_assert_eq!(refined.current_stat, induced);
        prop_assert_eq!(record.count(SearchPhase::Bisection), refined.iteration);
    }
}

#[test]
fn test_exact_match_consumes_no_iterations() {
    let config = SolverConfig::default();
    let mut evaluator = FnEvaluator::new(|p: f64| 0.25 + p);
    let mut record = EvaluationRecord::new();

    let bracketed = BracketFinder::new(config)
        .find(&mut evaluator, 0.0, 0.25, &mut record)
        .unwrap();
    let refined = BisectionRefiner::new(config)
        .refine(&mut evaluator, bracketed, &mut record)
        .unwrap();

    assert_eq!(bracketed.iteration, 0);
    assert_eq!(refined.iteration, 0);
    assert_eq!(refined.current_param, 0.0);
    assert_eq!(refined.bracket(), Some((0.0, 0.0)));
    assert_eq!(record.len(), 1);
}

#[test]
fn test_out_of_range_target_terminates() {
    let max_iterations = 12;
    let config = SolverConfig::new(1e-6, max_iterations);
    let mut calls = 0usize;
    let mut evaluator = FnEvaluator::new(|p: f64| {
        calls += 1;
        p.tanh()
    });
    let mut record = EvaluationRecord::new();

    let err = BracketFinder::new(config)
        .find(&mut evaluator, 0.0, 1.5, &mut record)
        .unwrap_err();
    drop(evaluator);

    assert!(err.is_non_convergence());
    assert!(matches!(err, SolverError::BracketNotFound { .. }));
    assert_eq!(calls, max_iterations + 1);
}

#[test]
fn test_non_monotone_evaluator_hits_bisection_cap() {
    let max_iterations = 9;
    let config = SolverConfig::new(1e-9, max_iterations);
    // Oscillates around the target between the bounds, never settling
    let mut evaluator = FnEvaluator::new(|p: f64| 0.5 + 0.2 * (40.0 * p).sin().signum());
    let mut record = EvaluationRecord::new();

    // 0.7 at p = 0 and 0.3 at p = -1, so the bracket is [-1, 0]; the
    // statistic never lands within tolerance of 0.5
    let state = BracketFinder::new(config)
        .find(&mut evaluator, 0.0, 0.5, &mut record)
        .unwrap();
    assert_eq!(state.bracket(), Some((-1.0, 0.0)));

    let err = BisectionRefiner::new(config)
        .refine(&mut evaluator, state, &mut record)
        .unwrap_err();
    assert!(matches!(
        err,
        SolverError::MaxIterationsExceeded { iterations, .. } if iterations == max_iterations
    ));
    assert_eq!(record.count(SearchPhase::Bracket), 1);
    assert_eq!(record.count(SearchPhase::Bisection), max_iterations);
    assert_eq!(record.len(), max_iterations + 2);
}
