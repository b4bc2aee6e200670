//! Parallel transcoding of replicated measurement files.
//!
//! [`enumerate_work`] lists the run's measurement files, and
//! [`Dispatcher`] fans them out over a bounded Rayon pool, capturing one
//! [`ConversionResult`] per item so a bad file or a flaky upload never
//! takes down the batch.

pub mod dispatch;
pub mod work;

pub use dispatch::{BatchSummary, ConversionResult, Dispatcher, FailureLine, Outcome, Stage};
pub use work::{WorkItem, enumerate_work, table_name};

use crate::config::RunLayout;
use crate::decode::MeasurementDecoder;
use crate::store::{RemoteStore, RetryConfig};
use anyhow::Result;
use std::sync::Arc;

/// Enumerate the run's measurement files and dispatch them in one call.
pub fn transcode_run(
    layout: &RunLayout,
    run: u32,
    workers: usize,
    decoder: Arc<dyn MeasurementDecoder>,
    store: Arc<dyn RemoteStore>,
    retry: RetryConfig,
) -> Result<BatchSummary> {
    let items = enumerate_work(layout, run)?;
    Dispatcher::new(decoder, store, retry).run(layout, run, items, workers)
}
