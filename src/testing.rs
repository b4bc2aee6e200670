//! Testing utilities: fixture trees and measurement-file builders.
//!
//! Shipped in the crate rather than `tests/` so downstream users can
//! build fixtures when testing their own decoder or store
//! implementations against the pipeline.

use crate::config::RunLayout;
use crate::decode::{SEGMENT_MAGIC, SEGMENT_VERSION};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Encode channels into the raw channel-segment layout read by
/// [`SegmentDecoder`](crate::decode::SegmentDecoder).
#[must_use]
pub fn encode_segment(channels: &[(&str, &[f64])]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(SEGMENT_MAGIC);
    bytes.extend_from_slice(&SEGMENT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(channels.len() as u16).to_le_bytes());
    for (name, samples) in channels {
        bytes.extend_from_slice(&(name.len() as u16).to_le_bytes());
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        for sample in *samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
    }
    bytes
}

/// Write a measurement file in the raw segment layout, creating parent
/// directories as needed.
pub fn write_segment_file(path: &Path, channels: &[(&str, &[f64])]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    fs::write(path, encode_segment(channels)).with_context(|| format!("create {}", path.display()))
}

/// Build a forceplate-style source tree: each `(leaf, files)` pair becomes
/// a leaf directory holding that many single-channel measurement files
/// with three samples each.
pub fn sample_source_tree(root: &Path, leaves: &[(&str, usize)]) -> Result<()> {
    for (leaf, files) in leaves {
        let dir = root.join(leaf);
        fs::create_dir_all(&dir).with_context(|| format!("mkdir -p {}", dir.display()))?;
        for i in 0..*files {
            let samples = [i as f64, 2.0 * i as f64, 3.0];
            let channels = [("samples", samples.as_slice())];
            write_segment_file(&dir.join(format!("capture{i:02}.tdms")), &channels)?;
        }
    }
    Ok(())
}

/// Temporary sandbox with a [`RunLayout`] rooted inside it. The
/// [`TempDir`] guard must stay alive for the duration of the test.
pub fn temp_layout() -> Result<(TempDir, RunLayout)> {
    let dir = tempfile::tempdir().context("create temp workspace")?;
    let layout = RunLayout::new(dir.path().join("generated"));
    Ok((dir, layout))
}

/// Sorted names of the entries directly under `path`.
pub fn sorted_entry_names(path: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("read dir {}", path.display()))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", path.display()))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
