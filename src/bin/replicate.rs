//! Replicates every leaf directory of a source tree N times into the
//! generated input root, synthesizing a larger dataset for a
//! benchmarking run.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tdmsflow::config::RunLayout;
use tdmsflow::replicate::replicate_run;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Duplicates all leaf folders placed under a root folder N times.
#[derive(Parser, Debug)]
#[command(
    name = "replicate",
    version,
    about = "Duplicates all leaf folders placed under a root folder N times"
)]
struct Args {
    /// Input data folder location
    #[arg(long = "i", value_name = "DIR", default_value = "forceplate")]
    input: PathBuf,

    /// Number of copies to generate (also names the generated run)
    #[arg(long = "n", value_name = "COUNT", default_value_t = 5)]
    copies: u32,

    /// Working area that receives the generated trees
    #[arg(long, value_name = "DIR", default_value = "generated")]
    workspace: PathBuf,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let layout = RunLayout::new(args.workspace);
    let report = replicate_run(&layout, &args.input, args.copies)?;
    if !report.is_clean() {
        error!(failed = report.failures.len(), "replication finished with failures");
    }
    Ok(report.is_clean())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
