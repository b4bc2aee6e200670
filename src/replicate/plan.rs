//! Leaf-directory enumeration and copy-plan construction.

use crate::config::COPY_INDEX_WIDTH;
use anyhow::{Context, Result, anyhow, ensure};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A directory with no subdirectories, the unit of replication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafDir {
    /// Path of the directory as found under the source root.
    pub path: PathBuf,
    /// Path relative to the source root, used to name destinations.
    pub relative: PathBuf,
}

/// One planned copy: a leaf directory and its destination for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub index: u32,
}

/// Find every leaf directory under `root`, sorted by relative path.
///
/// Directories holding both files and subdirectories are not leaves and
/// are never copy targets; their directly-contained files are surfaced
/// with a warning so the skip is visible rather than silent.
pub fn find_leaf_dirs(root: &Path) -> Result<Vec<LeafDir>> {
    ensure!(root.is_dir(), "source root {} is not a directory", root.display());
    let mut leaves = Vec::new();
    visit(root, root, &mut leaves)?;
    leaves.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(leaves)
}

fn visit(root: &Path, dir: &Path, leaves: &mut Vec<LeafDir>) -> Result<()> {
    let mut subdirs = Vec::new();
    let mut file_count = 0usize;
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", dir.display()))?;
        if entry.file_type().with_context(|| format!("stat {}", entry.path().display()))?.is_dir() {
            subdirs.push(entry.path());
        } else {
            file_count += 1;
        }
    }

    if subdirs.is_empty() {
        let relative = if dir == root {
            // The source root itself is a leaf; name copies after it.
            let name = root
                .file_name()
                .ok_or_else(|| anyhow!("source root {} has no directory name", root.display()))?;
            PathBuf::from(name)
        } else {
            dir.strip_prefix(root).expect("visited dir is under the source root").to_path_buf()
        };
        leaves.push(LeafDir { path: dir.to_path_buf(), relative });
        return Ok(());
    }

    if file_count > 0 {
        warn!(
            dir = %dir.display(),
            files = file_count,
            "directory has files next to subdirectories; those files are not replicated"
        );
    }
    subdirs.sort();
    for sub in subdirs {
        visit(root, &sub, leaves)?;
    }
    Ok(())
}

/// Destination directory name for one (leaf, index) pair. The zero-padded
/// index keeps destination names lexicographically sortable in numeric
/// order.
#[must_use]
pub fn copy_dir_name(relative: &Path, index: u32) -> String {
    format!("{}_{:0width$}", relative.display(), index, width = COPY_INDEX_WIDTH)
}

/// Build the full copy plan: one [`CopySpec`] per (leaf, index) pair.
#[must_use]
pub fn build_plan(leaves: &[LeafDir], input_root: &Path, copies: u32) -> Vec<CopySpec> {
    let mut plan = Vec::with_capacity(leaves.len() * copies as usize);
    for leaf in leaves {
        for index in 0..copies {
            let dest = input_root.join(copy_dir_name(&leaf.relative, index));
            plan.push(CopySpec { source: leaf.path.clone(), dest, index });
        }
    }
    plan
}
