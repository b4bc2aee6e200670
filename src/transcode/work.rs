//! Work-item enumeration for a transcode run.

use crate::config::RunLayout;
use anyhow::{Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One measurement file scheduled for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub path: PathBuf,
    /// Replication run this file belongs to.
    pub run: u32,
    /// Destination table name, `<parent-dir>.csv`.
    pub table: String,
}

/// Destination table name for a measurement file: the immediate parent
/// directory's name with a `.csv` suffix.
#[must_use]
pub fn table_name(path: &Path) -> Option<String> {
    let parent = path.parent()?.file_name()?;
    Some(format!("{}.csv", parent.to_string_lossy()))
}

/// Enumerate every measurement file under the run's input root, sorted
/// for deterministic dispatch order.
///
/// Files with no usable parent directory name are skipped with a warning.
pub fn enumerate_work(layout: &RunLayout, run: u32) -> Result<Vec<WorkItem>> {
    let pattern = layout.measurement_pattern(run);
    let paths = glob(&pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut items = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if !path.is_file() {
            continue;
        }
        match table_name(&path) {
            Some(table) => items.push(WorkItem { path, run, table }),
            None => {
                warn!(path = %path.display(), "measurement file has no parent directory name, skipping");
            }
        }
    }
    items.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(items)
}
