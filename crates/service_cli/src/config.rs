//! CLI configuration management
//!
//! Handles loading configuration from TOML files, environment variables and
//! CLI arguments.
//!
//! ```toml
//! log_level = "info"
//! seed = 42
//!
//! [prevalence]
//! target = 0.2
//! n_obs = 10000
//!
//! [hazard_ratio]
//! target = 2.0
//! n_obs = 5000
//! lambda = 2e-5
//! eta = 2.0
//!
//! [covariates]
//! n_vars = 3
//! rho = 0.2
//! n_binary = 1
//! coefficients = [0.7, 0.7, 0.7]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable overriding the base seed.
pub const ENV_SEED: &str = "COHORT_SEED";

/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "COHORT_LOG_LEVEL";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// `[prevalence]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrevalenceSection {
    /// Target marginal prevalence, in (0, 1)
    pub target: f64,
    /// Cohort size
    pub n_obs: usize,
    /// Absolute tolerance on the prevalence
    pub tolerance: f64,
    /// Per-phase iteration cap
    pub max_iterations: usize,
    /// Seed for this calibration; defaults to the base seed
    pub seed: Option<u64>,
}

impl Default for PrevalenceSection {
    fn default() -> Self {
        Self {
            target: 0.2,
            n_obs: 10_000,
            tolerance: 1e-5,
            max_iterations: 100,
            seed: None,
        }
    }
}

/// `[hazard_ratio]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HazardRatioSection {
    /// Target marginal hazard ratio, positive
    pub target: f64,
    /// Number of observations (each contributes one row per arm)
    pub n_obs: usize,
    /// Weibull scale
    pub lambda: f64,
    /// Weibull shape
    pub eta: f64,
    /// Absolute tolerance on the log hazard ratio
    pub tolerance: f64,
    /// Per-phase iteration cap
    pub max_iterations: usize,
    /// Seed for this calibration; defaults to the base seed plus one
    pub seed: Option<u64>,
}

impl Default for HazardRatioSection {
    fn default() -> Self {
        Self {
            target: 2.0,
            n_obs: 5_000,
            lambda: 2e-5,
            eta: 2.0,
            tolerance: 1e-5,
            max_iterations: 100,
            seed: None,
        }
    }
}

/// `[covariates]` section. When absent both cohorts are intercept-only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CovariateSection {
    /// Number of covariates
    pub n_vars: usize,
    /// Exchangeable correlation, used unless `correlation` is given
    pub rho: f64,
    /// Full correlation matrix, row-major `n_vars x n_vars`
    pub correlation: Option<Vec<f64>>,
    /// Leading covariates dichotomised at zero
    pub n_binary: usize,
    /// Linear predictor coefficients, one per covariate
    pub coefficients: Vec<f64>,
}

impl Default for CovariateSection {
    fn default() -> Self {
        Self {
            n_vars: 3,
            rho: 0.0,
            correlation: None,
            n_binary: 0,
            coefficients: vec![0.7; 3],
        }
    }
}

/// Complete CLI configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Base seed
    pub seed: u64,
    /// Prevalence calibration settings
    pub prevalence: PrevalenceSection,
    /// Hazard ratio calibration settings
    pub hazard_ratio: HazardRatioSection,
    /// Covariate design shared by both calibrations
    pub covariates: Option<CovariateSection>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            seed: cohort_models::calibration::DEFAULT_SEED,
            prevalence: PrevalenceSection::default(),
            hazard_ratio: HazardRatioSection::default(),
            covariates: None,
        }
    }
}

/// Custom deserializer for LogLevel that handles case-insensitive strings
fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(ENV_SEED) {
            self.seed = seed.trim().parse().map_err(|_| {
                ConfigError::EnvError(format!("{} must be an unsigned integer, got {:?}", ENV_SEED, seed))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        } else if cli.verbose && self.log_level == LogLevel::Info {
            self.log_level = LogLevel::Debug;
        }
    }

    /// Seed of the prevalence calibration
    pub fn prevalence_seed(&self) -> u64 {
        self.prevalence.seed.unwrap_or(self.seed)
    }

    /// Seed of the hazard ratio calibration
    pub fn hazard_ratio_seed(&self) -> u64 {
        self.hazard_ratio.seed.unwrap_or(self.seed.wrapping_add(1))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.prevalence;
        if !(p.target > 0.0 && p.target < 1.0) {
            return Err(ConfigError::invalid(
                "prevalence.target",
                format!("must lie in (0, 1), got {}", p.target),
            ));
        }
        check_run("prevalence", p.n_obs, p.tolerance, p.max_iterations)?;

        let h = &self.hazard_ratio;
        if !(h.target > 0.0 && h.target.is_finite()) {
            return Err(ConfigError::invalid(
                "hazard_ratio.target",
                format!("must be positive and finite, got {}", h.target),
            ));
        }
        if !(h.lambda > 0.0 && h.lambda.is_finite()) {
            return Err(ConfigError::invalid(
                "hazard_ratio.lambda",
                format!("must be positive, got {}", h.lambda),
            ));
        }
        if !(h.eta > 0.0 && h.eta.is_finite()) {
            return Err(ConfigError::invalid(
                "hazard_ratio.eta",
                format!("must be positive, got {}", h.eta),
            ));
        }
        check_run("hazard_ratio", h.n_obs, h.tolerance, h.max_iterations)?;

        if let Some(c) = &self.covariates {
            if c.n_vars == 0 {
                return Err(ConfigError::invalid("covariates.n_vars", "must be at least 1"));
            }
            if c.coefficients.len() != c.n_vars {
                return Err(ConfigError::invalid(
                    "covariates.coefficients",
                    format!("expected {} values, got {}", c.n_vars, c.coefficients.len()),
                ));
            }
            if c.n_binary > c.n_vars {
                return Err(ConfigError::invalid(
                    "covariates.n_binary",
                    format!("exceeds n_vars ({} > {})", c.n_binary, c.n_vars),
                ));
            }
            if let Some(matrix) = &c.correlation {
                if matrix.len() != c.n_vars * c.n_vars {
                    return Err(ConfigError::invalid(
                        "covariates.correlation",
                        format!("expected {} entries, got {}", c.n_vars * c.n_vars, matrix.len()),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn check_run(
    section: &'static str,
    n_obs: usize,
    tolerance: f64,
    max_iterations: usize,
) -> Result<(), ConfigError> {
    if n_obs == 0 {
        return Err(ConfigError::invalid(section, "n_obs must be at least 1"));
    }
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        return Err(ConfigError::invalid(
            section,
            format!("tolerance must be positive, got {}", tolerance),
        ));
    }
    if max_iterations == 0 {
        return Err(ConfigError::invalid(section, "max_iterations must be at least 1"));
    }
    Ok(())
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Seed override
    pub seed: Option<u64>,
    /// Log level override
    pub log_level: Option<LogLevel>,
    /// Raise the default level to debug
    pub verbose: bool,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.merge_with_cli(cli);
    config.validate()?;

    Ok(config)
}
