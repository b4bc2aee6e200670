//! # tdmsflow
//!
//! A **dataset replication and parallel transcoding pipeline** for binary
//! measurement files. tdmsflow synthesizes large benchmarking datasets by
//! fanning out a source directory tree, then converts every measurement
//! file of a run to CSV in parallel and uploads the artifacts to a remote
//! store.
//!
//! The crate ships two binaries used sequentially:
//!
//! - **`replicate`** walks a source tree and produces N labeled copies of
//!   every leaf directory under `generated/input<N>`, plus an empty
//!   `generated/output<N>` sibling for downstream results.
//! - **`transcode`** enumerates every measurement file under
//!   `generated/input<N>`, decodes each into a table, serializes it to CSV,
//!   and uploads it to `/generated/output<N>/<parent-dir>.csv` on the
//!   configured store.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tdmsflow::config::{RunLayout, StoreConfig, StoreTarget};
//! use tdmsflow::decode::SegmentDecoder;
//! use tdmsflow::replicate::replicate_run;
//! use tdmsflow::store::open_store;
//! use tdmsflow::transcode::transcode_run;
//!
//! # fn main() -> anyhow::Result<()> {
//! let layout = RunLayout::default();
//!
//! // Fan out every leaf of `forceplate/` three times.
//! let report = replicate_run(&layout, "forceplate".as_ref(), 3)?;
//! assert!(report.is_clean());
//!
//! // Convert the generated run with two workers.
//! let config = StoreConfig::new(StoreTarget::Dir("generated/remote".into()));
//! let store = open_store(&config)?;
//! let summary = transcode_run(&layout, 3, 2, Arc::new(SegmentDecoder), store, config.retry)?;
//! println!("{} rows in {:.2}s", summary.rows, summary.wall_secs);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! The heavy machinery is delegated to external collaborators behind trait
//! seams, so the pipeline itself stays small:
//!
//! - Work items are independent and embarrassingly parallel; dispatch is a
//!   bounded parallel map on a dedicated Rayon pool, not a scheduler.
//! - The vendor measurement format is decoded behind
//!   [`MeasurementDecoder`]; the crate ships [`SegmentDecoder`] for the raw
//!   channel-segment capture layout.
//! - The remote filesystem is the [`RemoteStore`] trait with local
//!   directory, in-memory fake, and WebHDFS backends.
//!
//! Per-item failures (bad file, flaky upload) are captured as
//! [`ConversionResult`]s instead of aborting the batch; transient store
//! errors are retried with exponential backoff, and persistent classes
//! (authentication) fail the run.
//!
//! ## Module Overview
//!
//! - [`config`] - run layout, naming constants, store configuration
//! - [`replicate`] - leaf enumeration and copy-plan execution
//! - [`transcode`] - work-item enumeration, parallel dispatch, summary
//! - [`decode`] - measurement decoding seam and the segment decoder
//! - [`table`] - tabular artifact and CSV serialization
//! - [`store`] - remote store trait, error taxonomy, retry, backends
//! - [`testing`] - fixture builders for integration tests

pub mod config;
pub mod decode;
pub mod replicate;
pub mod store;
pub mod table;
pub mod testing;
pub mod transcode;

// General re-exports
pub use config::{RunLayout, StoreConfig, StoreTarget};
pub use decode::{MeasurementDecoder, SegmentDecoder};
pub use replicate::{ReplicaReport, replicate_run};
pub use store::{DirStore, ErrorKind, FakeStore, RemoteStore, RetryConfig, StoreError, open_store};
pub use table::{Channel, Table};
pub use transcode::{BatchSummary, ConversionResult, Dispatcher, WorkItem, transcode_run};

// Gated re-exports
#[cfg(feature = "store-webhdfs")]
pub use store::WebHdfsStore;
