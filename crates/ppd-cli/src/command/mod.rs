use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ppd_core::scale::ScoreScale;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use self::{candidate::CandidateArg, cohort::CohortArg, thresholds::ThresholdsArg};

mod candidate;
mod cohort;
mod thresholds;

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Profile Pattern Diagnostics: descriptive, non-predictive profile structure analysis",
    long_about = None
)]
pub struct CommandArgs {
    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Analyze a single candidate
    Candidate(#[clap(flatten)] CandidateArg),
    /// Analyze a cohort and position every candidate within it
    Cohort(#[clap(flatten)] CohortArg),
    /// Print the default threshold configuration
    Thresholds(#[clap(flatten)] ThresholdsArg),
}

/// Options shared by the analysis commands
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EngineArg {
    /// Schema JSON file (inferred from the first candidate when omitted)
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Threshold configuration JSON file (built-in defaults when omitted)
    #[arg(long)]
    thresholds: Option<PathBuf>,
    /// Lower bound of the rubric scale
    #[arg(long, default_value_t = 0.0)]
    scale_min: f64,
    /// Upper bound of the rubric scale
    #[arg(long, default_value_t = 5.0)]
    scale_max: f64,
}

impl EngineArg {
    fn scale(&self) -> anyhow::Result<ScoreScale> {
        ScoreScale::new(self.scale_min, self.scale_max).context("Invalid --scale-min/--scale-max")
    }
}

fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .with_context(|| format!("Invalid log level: {log_level}"))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(&args.log_level)?;
    match args.mode {
        Mode::Candidate(arg) => candidate::run(&arg)?,
        Mode::Cohort(arg) => cohort::run(&arg)?,
        Mode::Thresholds(arg) => thresholds::run(&arg)?,
    }
    Ok(())
}
