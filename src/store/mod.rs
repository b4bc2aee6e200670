//! Remote artifact store seam.
//!
//! The distributed filesystem that receives transcoded artifacts is an
//! external collaborator; this module fixes the contract. [`RemoteStore`]
//! is **synchronous by design** to match the worker pool's blocking
//! execution model. Backends:
//!
//! - [`DirStore`] - a directory on the local filesystem, the CLI default
//! - [`FakeStore`] - in-memory store with scripted failures, for tests
//! - [`WebHdfsStore`] - a WebHDFS REST endpoint (feature `store-webhdfs`)
//!
//! Errors carry an [`ErrorKind`]; transient kinds are retried with
//! exponential backoff via [`retry_with_backoff`], persistent kinds
//! (authentication, authorization) fail a whole run.

pub mod error;
pub mod fake;
pub mod local;
pub mod retry;
#[cfg(feature = "store-webhdfs")]
pub mod webhdfs;

pub use error::{ErrorKind, StoreError, StoreResult};
pub use fake::FakeStore;
pub use local::DirStore;
pub use retry::{RetryConfig, retry_with_backoff};
#[cfg(feature = "store-webhdfs")]
pub use webhdfs::WebHdfsStore;

use crate::config::{StoreConfig, StoreTarget};
use anyhow::Result;
use std::sync::Arc;

/// Upload/readback contract for a run's artifact store.
///
/// Paths are absolute-style (`/generated/output10/forceplate.csv`)
/// regardless of the backend.
pub trait RemoteStore: Send + Sync {
    /// Upload an object, creating missing parent directories. With
    /// `overwrite` unset, an existing object is an
    /// [`ErrorKind::AlreadyExists`] failure.
    fn put(&self, path: &str, data: &[u8], overwrite: bool) -> StoreResult<()>;

    /// Download an object.
    fn get(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Create a directory and any missing parents; succeeds if present.
    fn mkdirs(&self, path: &str) -> StoreResult<()>;

    /// Whether an object or directory exists at `path`.
    fn exists(&self, path: &str) -> StoreResult<bool>;

    /// Names of the objects directly under `path`, sorted.
    fn list(&self, path: &str) -> StoreResult<Vec<String>>;
}

/// Construct the store client described by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn RemoteStore>> {
    match &config.target {
        StoreTarget::Dir(root) => Ok(Arc::new(DirStore::new(root.clone()))),
        #[cfg(feature = "store-webhdfs")]
        StoreTarget::WebHdfs { host, port } => {
            Ok(Arc::new(WebHdfsStore::connect(host, *port, config)?))
        }
        #[cfg(not(feature = "store-webhdfs"))]
        StoreTarget::WebHdfs { .. } => {
            anyhow::bail!("webhdfs store support not compiled in (enable feature `store-webhdfs`)")
        }
    }
}
