//! Criterion benchmarks for the evaluators and the Cox fitter.
//!
//! Measures one evaluator call and one full calibration across cohort sizes
//! to characterise the `O(n log n)` scaling of the hazard ratio evaluator.

use cohort_core::traits::Evaluator;
use cohort_models::calibration::{HazardRatioCalibration, PrevalenceCalibration};
use cohort_models::covariates::{CorrelationMatrix, CovariateGenerator, LinearPredictor};
use cohort_models::evaluators::{
    CohortDesign, MarginalHazardRatioEvaluator, PrevalenceEvaluator, SimulationDataset,
};
use cohort_models::rng::{SeededSource, SimRng};
use cohort_models::survival::{CoxData, CoxRegression, WeibullBaseline};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Two-arm exponential survival data with a log hazard ratio of 0.5.
fn generate_two_arm(n_per_arm: usize) -> (Vec<f64>, Vec<bool>, Vec<f64>) {
    let mut rng = SimRng::from_seed(1);
    let mut times = Vec::with_capacity(2 * n_per_arm);
    let mut z = Vec::with_capacity(2 * n_per_arm);
    for arm in 0..2 {
        let rate = (0.5 * arm as f64).exp();
        for _ in 0..n_per_arm {
            times.push(-rng.gen_open_uniform().ln() / rate);
            z.push(arm as f64);
        }
    }
    let events = vec![true; times.len()];
    (times, events, z)
}

fn weibull() -> WeibullBaseline {
    WeibullBaseline::new(2e-5, 2.0).unwrap()
}

/// Benchmark a single Cox fit.
fn bench_cox_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cox_fit");
    let cox = CoxRegression::default();

    for size in [500, 2_500, 5_000] {
        let (times, events, z) = generate_two_arm(size);
        group.bench_with_input(BenchmarkId::new("two_arm", 2 * size), &size, |b, _| {
            let data = CoxData::new(&times, &events, &z, 1).unwrap();
            b.iter(|| cox.fit(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark single evaluator calls.
fn bench_evaluators(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for size in [1_000, 5_000, 10_000] {
        let dataset = SimulationDataset::intercept_only(size).unwrap();

        let mut prevalence = PrevalenceEvaluator::new(dataset.clone(), SeededSource::new(3));
        group.bench_with_input(BenchmarkId::new("prevalence", size), &size, |b, _| {
            b.iter(|| prevalence.evaluate(black_box(0.25)).unwrap());
        });

        let mut hazard = MarginalHazardRatioEvaluator::new(dataset, weibull(), SeededSource::new(4));
        group.bench_with_input(BenchmarkId::new("hazard_ratio", size), &size, |b, _| {
            b.iter(|| hazard.evaluate(black_box(0.7)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark complete calibration runs.
fn bench_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibration");
    group.sample_size(10);

    group.bench_function("prevalence_10000", |b| {
        let calibration = PrevalenceCalibration::new(0.5, CohortDesign::intercept_only(10_000));
        b.iter(|| calibration.run().unwrap());
    });

    group.bench_function("hazard_ratio_5000_covariates", |b| {
        let generator = CovariateGenerator::new(&CorrelationMatrix::identity(3)).unwrap();
        let predictor = LinearPredictor::new(vec![0.7, 0.7, 0.7]).unwrap();
        let design = CohortDesign::with_covariates(5_000, generator, predictor).unwrap();
        let calibration = HazardRatioCalibration::new(2.0, weibull(), design);
        b.iter(|| calibration.run().unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_cox_fit, bench_evaluators, bench_calibration);
criterion_main!(benches);
