//! Copy-plan execution.

use super::plan::{CopySpec, build_plan, find_leaf_dirs};
use crate::config::RunLayout;
use anyhow::{Context, Result, ensure};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// One copy that could not be completed.
#[derive(Debug, Clone)]
pub struct CopyFailure {
    pub spec: CopySpec,
    pub reason: String,
}

/// Result of executing a replication plan.
#[derive(Debug, Default)]
pub struct ReplicaReport {
    /// Destination directories fully populated.
    pub copied: usize,
    /// Files copied across all destinations.
    pub files: u64,
    pub failures: Vec<CopyFailure>,
}

impl ReplicaReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Copy a directory tree (or a single file) to `dest`, preserving
/// structure. Returns the number of files copied.
///
/// A plain-file source is copied directly to the destination path - the
/// fallback for sources that turn out not to be directories.
pub fn copy_tree(source: &Path, dest: &Path) -> io::Result<u64> {
    if !source.is_dir() {
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, dest)?;
        return Ok(1);
    }

    fs::create_dir_all(dest)?;
    let mut files = 0;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            files += copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

/// Execute every spec, tolerating per-spec failures: a failed copy is
/// logged and recorded, and the rest of the plan still runs.
pub fn execute_plan(plan: &[CopySpec]) -> ReplicaReport {
    let mut report = ReplicaReport::default();
    for spec in plan {
        match copy_tree(&spec.source, &spec.dest) {
            Ok(files) => {
                debug!(dest = %spec.dest.display(), files, "copied");
                report.copied += 1;
                report.files += files;
            }
            Err(err) => {
                warn!(
                    source = %spec.source.display(),
                    dest = %spec.dest.display(),
                    %err,
                    "copy skipped"
                );
                report.failures.push(CopyFailure { spec: spec.clone(), reason: err.to_string() });
            }
        }
    }
    report
}

/// Replicate every leaf of `source` `copies` times into the run's input
/// root and create the empty output root.
///
/// Root creation is idempotent, so re-running with the same count
/// overwrites the previous fan-out in place without duplicating beyond
/// leaves × copies.
pub fn replicate_run(layout: &RunLayout, source: &Path, copies: u32) -> Result<ReplicaReport> {
    ensure!(copies > 0, "copy count must be positive");

    let input_root = layout.input_root(copies);
    let output_root = layout.output_root(copies);
    fs::create_dir_all(&input_root).with_context(|| format!("create {}", input_root.display()))?;
    fs::create_dir_all(&output_root).with_context(|| format!("create {}", output_root.display()))?;

    let leaves = find_leaf_dirs(source)?;
    let plan = build_plan(&leaves, &input_root, copies);
    info!(leaves = leaves.len(), copies, dest = %input_root.display(), "replicating");

    let report = execute_plan(&plan);
    info!(
        copied = report.copied,
        files = report.files,
        failed = report.failures.len(),
        "replication finished"
    );
    Ok(report)
}
