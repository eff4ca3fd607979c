//! cohort-sim - Command Line Calibration of Simulated Cohorts
//!
//! Operational entry point for the cohort simulation toolkit.
//!
//! # Commands
//!
//! - `cohort-sim prevalence` - Calibrate the outcome intercept to a target prevalence
//! - `cohort-sim hazard-ratio` - Calibrate the treatment coefficient to a target marginal hazard ratio
//! - `cohort-sim all` - Run both, prevalence first, each with its own seed
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate reads configuration, installs
//! logging and drives the calibrations in `cohort_models`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::calibrate::Selection;
use config::{build_config, CliArgs, LogLevel};

/// Cohort simulation calibration CLI
#[derive(Parser, Debug)]
#[command(name = "cohort-sim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Base seed, overriding the configuration file and COHORT_SEED
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output file for the calibrated estimates (JSON)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output file for the evaluation history (CSV)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Calibrate the outcome intercept to a target marginal prevalence
    Prevalence,

    /// Calibrate the treatment coefficient to a target marginal hazard ratio
    HazardRatio,

    /// Run both calibrations
    All,
}

impl From<Commands> for Selection {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Prevalence => Selection::Prevalence,
            Commands::HazardRatio => Selection::HazardRatio,
            Commands::All => Selection::All,
        }
    }
}

/// `RUST_LOG` wins; otherwise the configured level applies.
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
    }

    let config = build_config(&CliArgs {
        config_file: cli.config.clone(),
        seed: cli.seed,
        log_level: cli.log_level,
        verbose: cli.verbose,
    })?;

    init_tracing(config.log_level);

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    info!(
        seed = config.seed,
        log_level = %config.log_level,
        "Configuration loaded"
    );

    commands::calibrate::run(
        &config,
        cli.command.into(),
        cli.output.as_deref(),
        cli.history.as_deref(),
    )?;

    info!("Calibration complete");
    Ok(())
}
