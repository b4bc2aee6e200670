//! Runtime configuration: run layout on the local filesystem and the
//! connection settings handed to the remote store client.

use crate::store::RetryConfig;
use anyhow::{Context, bail, ensure};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File extension of binary measurement files.
pub const MEASUREMENT_EXT: &str = "tdms";

/// Copy indices are zero-padded to this width so destination names sort
/// lexicographically in numeric order for up to 999999 copies.
pub const COPY_INDEX_WIDTH: usize = 6;

/// Local working area holding the generated trees of each replication run.
///
/// Run `N` lives in `input<N>` (the fan-out copies) and `output<N>` (an
/// empty local placeholder; real artifacts go to the remote store). The
/// remote side mirrors the workspace name, so the default workspace
/// `generated` maps run 10 to `/generated/output10` on the store.
#[derive(Debug, Clone)]
pub struct RunLayout {
    workspace: PathBuf,
}

impl RunLayout {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self { workspace: workspace.into() }
    }

    #[must_use]
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Local root receiving the fan-out copies of run `run`.
    #[must_use]
    pub fn input_root(&self, run: u32) -> PathBuf {
        self.workspace.join(format!("input{run}"))
    }

    /// Local placeholder output directory of run `run`.
    #[must_use]
    pub fn output_root(&self, run: u32) -> PathBuf {
        self.workspace.join(format!("output{run}"))
    }

    /// Remote directory that receives the run's CSV artifacts.
    #[must_use]
    pub fn remote_output_dir(&self, run: u32) -> String {
        format!("/{}/output{run}", self.workspace_name())
    }

    /// Remote path of one named artifact of the run.
    #[must_use]
    pub fn remote_artifact_path(&self, run: u32, table: &str) -> String {
        format!("{}/{table}", self.remote_output_dir(run))
    }

    /// Recursive glob matching every measurement file of the run.
    #[must_use]
    pub fn measurement_pattern(&self, run: u32) -> String {
        format!("{}/**/*.{MEASUREMENT_EXT}", self.input_root(run).display())
    }

    fn workspace_name(&self) -> String {
        self.workspace
            .file_name()
            .map_or_else(|| "generated".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl Default for RunLayout {
    fn default() -> Self {
        Self::new("generated")
    }
}

/// Where transcoded artifacts are uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// A directory on the local filesystem acting as the store root.
    Dir(PathBuf),
    /// A WebHDFS endpoint, written `webhdfs://host:port`.
    WebHdfs { host: String, port: u16 },
}

impl FromStr for StoreTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("webhdfs://") {
            let Some((host, port)) = rest.rsplit_once(':') else {
                bail!("webhdfs target `{s}` is missing a port (expected webhdfs://host:port)");
            };
            ensure!(!host.is_empty(), "webhdfs target `{s}` is missing a host");
            let port = port
                .parse::<u16>()
                .with_context(|| format!("webhdfs target `{s}` has an invalid port"))?;
            return Ok(Self::WebHdfs { host: host.to_string(), port });
        }
        ensure!(!s.is_empty(), "store target must not be empty");
        Ok(Self::Dir(PathBuf::from(s)))
    }
}

/// Connection settings passed to the store client at construction.
///
/// Nothing network-addressed is a compile-time constant; the target, the
/// user identity, and the timeout/retry policy all travel through here.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub target: StoreTarget,
    /// User name forwarded to stores with insecure authentication.
    pub user: Option<String>,
    /// Per-request timeout for network-backed stores.
    pub timeout_secs: u64,
    /// Backoff policy for transient store failures.
    pub retry: RetryConfig,
}

impl StoreConfig {
    pub fn new(target: StoreTarget) -> Self {
        Self { target, user: None, timeout_secs: 30, retry: RetryConfig::default() }
    }

    #[must_use]
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
