//! Calibrate command implementation
//!
//! Runs the prevalence and/or marginal hazard ratio calibrations described by
//! an [`AppConfig`], writes a JSON report of the estimates and, optionally,
//! the evaluation history as CSV.

use std::path::{Path, PathBuf};

use cohort_core::types::SearchPhase;
use cohort_models::calibration::{
    CalibrationResult, HazardRatioCalibration, PrevalenceCalibration, Termination,
};
use cohort_models::covariates::{
    CorrelationMatrix, CovariateError, CovariateGenerator, LinearPredictor,
};
use cohort_models::evaluators::CohortDesign;
use cohort_models::survival::WeibullBaseline;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AppConfig, CovariateSection};
use crate::{CliError, Result};

/// Which calibrations to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Prevalence,
    HazardRatio,
    All,
}

impl Selection {
    fn includes_prevalence(self) -> bool {
        matches!(self, Selection::Prevalence | Selection::All)
    }

    fn includes_hazard_ratio(self) -> bool {
        matches!(self, Selection::HazardRatio | Selection::All)
    }
}

/// Summary of one calibration run, as written to the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub seed: u64,
    pub n_obs: usize,
    pub target: f64,
    pub estimated_parameter: f64,
    pub induced_statistic: f64,
    pub target_statistic: f64,
    /// `exp(estimated_parameter)`, the conditional hazard ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_hazard_ratio: Option<f64>,
    pub converged: bool,
    pub termination: Termination,
    pub bracket_iterations: usize,
    pub bisection_iterations: usize,
    pub evaluations: usize,
    pub bracket: Option<(f64, f64)>,
    pub final_diff: f64,
    pub duration_ms: f64,
}

impl CalibrationReport {
    fn new(seed: u64, n_obs: usize, target: f64, result: &CalibrationResult) -> Self {
        let d = &result.diagnostics;
        Self {
            seed,
            n_obs,
            target,
            estimated_parameter: result.estimate.estimated_parameter,
            induced_statistic: result.estimate.induced_statistic,
            target_statistic: result.estimate.target_statistic,
            conditional_hazard_ratio: None,
            converged: result.converged,
            termination: d.termination,
            bracket_iterations: d.bracket_iterations,
            bisection_iterations: d.bisection_iterations,
            evaluations: d.evaluations,
            bracket: d.bracket,
            final_diff: d.final_diff,
            duration_ms: d.duration.as_secs_f64() * 1e3,
        }
    }
}

/// JSON report written by `--output`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevalence: Option<CalibrationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hazard_ratio: Option<CalibrationReport>,
}

/// One CSV row of the evaluation history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub evaluation: usize,
    pub phase: SearchPhase,
    pub iteration: usize,
    pub param: f64,
    pub stat: f64,
    pub target: f64,
    pub diff: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

/// Flatten a result's history into CSV rows.
pub fn history_rows(result: &CalibrationResult) -> Vec<HistoryRow> {
    result
        .history
        .iter()
        .enumerate()
        .map(|(evaluation, entry)| HistoryRow {
            evaluation,
            phase: entry.phase,
            iteration: entry.state.iteration,
            param: entry.state.current_param,
            stat: entry.state.current_stat,
            target: entry.state.target_stat,
            diff: entry.state.diff(),
            lower_bound: entry.state.lower_bound,
            upper_bound: entry.state.upper_bound,
        })
        .collect()
}

/// Build the cohort design for `n_obs` observations.
pub fn build_design(covariates: Option<&CovariateSection>, n_obs: usize) -> Result<CohortDesign> {
    let Some(section) = covariates else {
        return Ok(CohortDesign::intercept_only(n_obs));
    };

    let correlation = match &section.correlation {
        Some(matrix) => CorrelationMatrix::new(matrix, section.n_vars),
        None => CorrelationMatrix::exchangeable(section.n_vars, section.rho),
    }
    .map_err(CovariateError::from)?;

    let generator = CovariateGenerator::new(&correlation)?.with_binary_prefix(section.n_binary)?;
    let predictor = LinearPredictor::new(section.coefficients.clone())?;
    Ok(CohortDesign::with_covariates(n_obs, generator, predictor)?)
}

/// Run the prevalence calibration.
pub fn calibrate_prevalence(config: &AppConfig) -> Result<(CalibrationReport, CalibrationResult)> {
    let section = &config.prevalence;
    let seed = config.prevalence_seed();
    let design = build_design(config.covariates.as_ref(), section.n_obs)?;

    let result = PrevalenceCalibration::new(section.target, design)
        .with_seed(seed)
        .with_tolerance(section.tolerance)
        .with_max_iterations(section.max_iterations)
        .run()?;

    let report = CalibrationReport::new(seed, section.n_obs, section.target, &result);
    Ok((report, result))
}

/// Run the marginal hazard ratio calibration.
pub fn calibrate_hazard_ratio(
    config: &AppConfig,
) -> Result<(CalibrationReport, CalibrationResult)> {
    let section = &config.hazard_ratio;
    let seed = config.hazard_ratio_seed();
    let baseline = WeibullBaseline::new(section.lambda, section.eta)?;
    let design = build_design(config.covariates.as_ref(), section.n_obs)?;

    let result = HazardRatioCalibration::new(section.target, baseline, design)
        .with_seed(seed)
        .with_tolerance(section.tolerance)
        .with_max_iterations(section.max_iterations)
        .run()?;

    let mut report = CalibrationReport::new(seed, section.n_obs, section.target, &result);
    report.conditional_hazard_ratio = Some(result.parameter().exp());
    Ok((report, result))
}

/// `history.csv` becomes `history_<suffix>.csv`.
pub fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(name)
}

/// Write the evaluation history of one run as CSV.
pub fn write_history(path: &Path, result: &CalibrationResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in history_rows(result) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the JSON report.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn print_summary(name: &str, report: &CalibrationReport) {
    println!(
        "{:<14} parameter = {:>12.6}  statistic = {:>10.6}  target = {:>10.6}  {} ({} evaluations)",
        name,
        report.estimated_parameter,
        report.induced_statistic,
        report.target_statistic,
        report.termination,
        report.evaluations,
    );
}

/// Run the calibrate command
pub fn run(
    config: &AppConfig,
    selection: Selection,
    output: Option<&Path>,
    history: Option<&Path>,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    let mut failed: Option<CliError> = None;

    let history_path = |suffix: &str| {
        history.map(|path| match selection {
            Selection::All => suffixed_path(path, suffix),
            _ => path.to_path_buf(),
        })
    };

    if selection.includes_prevalence() {
        let (summary, result) = calibrate_prevalence(config)?;
        print_summary("prevalence", &summary);
        if let Some(path) = history_path("prevalence") {
            info!("Writing prevalence history to: {}", path.display());
            write_history(&path, &result)?;
        }
        if !summary.converged {
            failed = Some(CliError::NotConverged {
                calibration: "prevalence",
                termination: summary.termination,
            });
        }
        report.prevalence = Some(summary);
    }

    if selection.includes_hazard_ratio() {
        let (summary, result) = calibrate_hazard_ratio(config)?;
        print_summary("hazard ratio", &summary);
        if let Some(path) = history_path("hazard_ratio") {
            info!("Writing hazard ratio history to: {}", path.display());
            write_history(&path, &result)?;
        }
        if !summary.converged && failed.is_none() {
            failed = Some(CliError::NotConverged {
                calibration: "hazard ratio",
                termination: summary.termination,
            });
        }
        report.hazard_ratio = Some(summary);
    }

    if let Some(path) = output {
        info!("Writing estimates to: {}", path.display());
        write_report(path, &report)?;
    }

    match failed {
        Some(err) => {
            warn!("{}", err);
            Err(err)
        }
        None => Ok(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HazardRatioSection, PrevalenceSection};
    use approx::assert_relative_eq;

    fn small_config() -> AppConfig {
        AppConfig {
            seed: 11,
            prevalence: PrevalenceSection {
                target: 0.25,
                n_obs: 2_000,
                ..Default::default()
            },
            hazard_ratio: HazardRatioSection {
                n_obs: 2_000,
                tolerance: 1e-3,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cohort-sim-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_suffixed_path() {
        assert_eq!(
            suffixed_path(Path::new("out/history.csv"), "prevalence"),
            PathBuf::from("out/history_prevalence.csv")
        );
        assert_eq!(
            suffixed_path(Path::new("history"), "hazard_ratio"),
            PathBuf::from("history_hazard_ratio")
        );
    }

    #[test]
    fn test_build_design() {
        let design = build_design(None, 10).unwrap();
        assert_eq!(design.n_obs(), 10);

        let section = CovariateSection {
            n_vars: 2,
            rho: 0.4,
            n_binary: 1,
            coefficients: vec![0.3, 0.3],
            correlation: None,
        };
        assert!(build_design(Some(&section), 10).is_ok());

        let bad = CovariateSection {
            correlation: Some(vec![1.0, 2.0, 2.0, 1.0]),
            ..section
        };
        assert!(matches!(
            build_design(Some(&bad), 10),
            Err(CliError::Covariate(_))
        ));
    }

    #[test]
    fn test_history_rows_follow_record() {
        let (report, result) = calibrate_prevalence(&small_config()).unwrap();
        let rows = history_rows(&result);

        assert_eq!(rows.len(), report.evaluations);
        assert_eq!(rows[0].phase, SearchPhase::Initial);
        assert_eq!(rows[0].param, 0.0);
        assert!(rows.iter().enumerate().all(|(i, r)| r.evaluation == i));
        let last = rows.last().unwrap();
        assert_eq!(last.param, report.estimated_parameter);
        assert_relative_eq!(last.diff, (last.stat - last.target).abs());
    }

    #[test]
    fn test_hazard_ratio_report_carries_conditional_ratio() {
        let (report, result) = calibrate_hazard_ratio(&small_config()).unwrap();
        assert!(report.converged);
        assert_eq!(report.seed, 12);
        assert_relative_eq!(report.target_statistic, 2.0_f64.ln());
        assert_relative_eq!(
            report.conditional_hazard_ratio.unwrap(),
            result.parameter().exp()
        );
    }

    #[test]
    fn test_run_all_writes_outputs() {
        let dir = scratch_dir("all");
        let output = dir.join("estimates.json");
        let history = dir.join("history.csv");

        let report = run(&small_config(), Selection::All, Some(&output), Some(&history)).unwrap();
        assert!(report.prevalence.is_some());
        assert!(report.hazard_ratio.is_some());

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["prevalence"]["converged"], true);
        assert_eq!(json["prevalence"]["termination"], "converged");
        assert!(json["prevalence"].get("conditional_hazard_ratio").is_none());
        assert!(json["hazard_ratio"]["conditional_hazard_ratio"].is_number());

        let mut reader = csv::Reader::from_path(dir.join("history_prevalence.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[1], "phase");
        let records: Vec<_> = reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(records.len(), report.prevalence.unwrap().evaluations);
        assert_eq!(&records[0][1], "initial");
        assert!(dir.join("history_hazard_ratio.csv").exists());
        assert!(!history.exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_single_selection_uses_history_path_verbatim() {
        let dir = scratch_dir("single");
        let history = dir.join("prevalence.csv");

        let report = run(&small_config(), Selection::Prevalence, None, Some(&history)).unwrap();
        assert!(report.hazard_ratio.is_none());
        assert!(history.exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_non_convergence_is_an_error_after_writing_report() {
        let dir = scratch_dir("capped");
        let output = dir.join("estimates.json");
        let mut config = small_config();
        config.prevalence.target = 0.999_999;
        config.prevalence.max_iterations = 2;

        let err = run(&config, Selection::Prevalence, Some(&output), None).unwrap_err();
        assert!(matches!(
            err,
            CliError::NotConverged {
                calibration: "prevalence",
                termination: Termination::BracketNotFound,
            }
        ));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["prevalence"]["converged"], false);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
