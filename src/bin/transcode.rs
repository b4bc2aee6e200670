//! Converts the measurement files of a replicated run into CSV tables and
//! uploads them to the remote store.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tdmsflow::config::{RunLayout, StoreConfig, StoreTarget};
use tdmsflow::decode::SegmentDecoder;
use tdmsflow::store::open_store;
use tdmsflow::transcode::transcode_run;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Converts measurement files stored under a generated input root into
/// CSV tables on the remote store.
#[derive(Parser, Debug)]
#[command(
    name = "transcode",
    version,
    about = "Converts the measurement files of a replicated run into CSV tables"
)]
struct Args {
    /// Replication run to convert (names input<N> and output<N>)
    #[arg(long = "n", value_name = "RUN", default_value_t = 10)]
    run: u32,

    /// Number of parallel workers (0 uses every logical CPU)
    #[arg(long = "w", value_name = "COUNT", default_value_t = 2)]
    workers: usize,

    /// Working area holding the generated input trees
    #[arg(long, value_name = "DIR", default_value = "generated")]
    workspace: PathBuf,

    /// Store target: a local directory or webhdfs://host:port
    #[arg(long, value_name = "TARGET", default_value = "generated/remote")]
    store: StoreTarget,

    /// User name forwarded to stores with insecure authentication
    #[arg(long, value_name = "NAME", env = "TDMSFLOW_STORE_USER")]
    store_user: Option<String>,

    /// Per-request store timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    store_timeout: u64,

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
    let config = StoreConfig::new(args.store)
        .with_user(args.store_user)
        .with_timeout_secs(args.store_timeout);
    let store = open_store(&config)?;

    let summary =
        transcode_run(&layout, args.run, args.workers, Arc::new(SegmentDecoder), store, config.retry)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if !summary.is_clean() {
        error!(failed = summary.failed, "transcode finished with failures");
    }
    Ok(summary.is_clean())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
