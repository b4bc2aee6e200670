//! Parallel dispatch and per-item outcome capture.

use super::work::WorkItem;
use crate::config::RunLayout;
use crate::decode::MeasurementDecoder;
use crate::store::{RemoteStore, RetryConfig, retry_with_backoff};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Conversion stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Decode,
    Serialize,
    Upload,
}

/// Per-item outcome: upload statistics or a stage-tagged failure.
#[derive(Debug, Clone)]
pub enum Outcome {
    Uploaded { rows: usize, bytes: usize },
    Failed { stage: Stage, reason: String, fatal: bool },
}

impl Outcome {
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// A [`WorkItem`] plus what happened to it.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub item: WorkItem,
    pub outcome: Outcome,
}

/// One failed item, as reported in the batch summary.
#[derive(Debug, Clone, Serialize)]
pub struct FailureLine {
    pub table: String,
    pub stage: Stage,
    pub reason: String,
}

/// Totals for one transcode run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run: u32,
    pub workers: usize,
    pub items: usize,
    pub uploaded: usize,
    pub failed: usize,
    /// Data rows across all uploaded artifacts.
    pub rows: usize,
    /// Wall-clock duration of the whole batch in seconds.
    pub wall_secs: f64,
    pub failures: Vec<FailureLine>,
}

impl BatchSummary {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Fans work items out over a bounded worker pool.
///
/// Items are independent and write to disjoint destinations, so dispatch
/// is a plain parallel map; scheduling inside the pool is Rayon's
/// concern, not ours.
pub struct Dispatcher {
    decoder: Arc<dyn MeasurementDecoder>,
    store: Arc<dyn RemoteStore>,
    retry: RetryConfig,
}

impl Dispatcher {
    pub fn new(
        decoder: Arc<dyn MeasurementDecoder>,
        store: Arc<dyn RemoteStore>,
        retry: RetryConfig,
    ) -> Self {
        Self { decoder, store, retry }
    }

    /// Convert and upload every item, returning the batch summary.
    ///
    /// The batch always runs to completion and per-item failures land in
    /// the summary. A persistent store failure (authentication) still
    /// fails the whole run once the batch has drained - the store would
    /// keep rejecting every retry of the run anyway.
    pub fn run(
        &self,
        layout: &RunLayout,
        run: u32,
        items: Vec<WorkItem>,
        workers: usize,
    ) -> Result<BatchSummary> {
        let started = Instant::now();
        let workers = if workers == 0 { num_cpus::get() } else { workers };

        let out_dir = layout.remote_output_dir(run);
        retry_with_backoff(&self.retry, || self.store.mkdirs(&out_dir))
            .with_context(|| format!("create remote directory {out_dir}"))?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("build worker pool")?;

        info!(run, workers, items = items.len(), "dispatching transcode batch");
        let results: Vec<ConversionResult> = pool
            .install(|| items.into_par_iter().map(|item| self.convert_one(layout, item)).collect());

        let mut summary = BatchSummary {
            run,
            workers,
            items: results.len(),
            uploaded: 0,
            failed: 0,
            rows: 0,
            wall_secs: 0.0,
            failures: Vec::new(),
        };
        let mut fatal: Option<String> = None;
        for result in &results {
            match &result.outcome {
                Outcome::Uploaded { rows, .. } => {
                    summary.uploaded += 1;
                    summary.rows += rows;
                }
                Outcome::Failed { stage, reason, fatal: is_fatal } => {
                    summary.failed += 1;
                    summary.failures.push(FailureLine {
                        table: result.item.table.clone(),
                        stage: *stage,
                        reason: reason.clone(),
                    });
                    if *is_fatal && fatal.is_none() {
                        fatal = Some(reason.clone());
                    }
                }
            }
        }
        summary.wall_secs = started.elapsed().as_secs_f64();
        info!(
            uploaded = summary.uploaded,
            failed = summary.failed,
            wall_secs = summary.wall_secs,
            "transcode batch finished"
        );

        if let Some(reason) = fatal {
            bail!("store rejected the run after {} failed items: {reason}", summary.failed);
        }
        Ok(summary)
    }

    fn convert_one(&self, layout: &RunLayout, item: WorkItem) -> ConversionResult {
        let bytes = match fs::read(&item.path) {
            Ok(bytes) => bytes,
            Err(err) => return fail(item, Stage::Read, err.to_string(), false),
        };
        let table = match self.decoder.decode(&bytes) {
            Ok(table) => table,
            Err(err) => return fail(item, Stage::Decode, format!("{err:#}"), false),
        };
        let rows = table.row_count();
        let csv = match table.to_csv_bytes() {
            Ok(csv) => csv,
            Err(err) => return fail(item, Stage::Serialize, format!("{err:#}"), false),
        };

        let dest = layout.remote_artifact_path(item.run, &item.table);
        match retry_with_backoff(&self.retry, || self.store.put(&dest, &csv, true)) {
            Ok(()) => {
                debug!(table = %item.table, rows, bytes = csv.len(), "uploaded");
                ConversionResult { item, outcome: Outcome::Uploaded { rows, bytes: csv.len() } }
            }
            Err(err) => {
                let fatal = err.kind.is_fatal();
                fail(item, Stage::Upload, err.to_string(), fatal)
            }
        }
    }
}

fn fail(item: WorkItem, stage: Stage, reason: String, fatal: bool) -> ConversionResult {
    warn!(table = %item.table, ?stage, reason = %reason, "conversion failed");
    ConversionResult { item, outcome: Outcome::Failed { stage, reason, fatal } }
}
