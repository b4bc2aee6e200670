//! Local-directory store backend.

use super::{ErrorKind, RemoteStore, StoreError, StoreResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Store backed by a directory on the local filesystem.
///
/// Store paths are absolute-style (`/generated/output10/run.csv`) and
/// resolve under the configured root; paths escaping the root are
/// rejected.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let trimmed = path.trim_start_matches('/');
        if Path::new(trimmed).components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(StoreError::new(
                ErrorKind::InvalidInput,
                format!("path {path} escapes the store root"),
            ));
        }
        Ok(self.root.join(trimmed))
    }
}

impl RemoteStore for DirStore {
    fn put(&self, path: &str, data: &[u8], overwrite: bool) -> StoreResult<()> {
        let full = self.resolve(path)?;
        if !overwrite && full.exists() {
            return Err(StoreError::new(
                ErrorKind::AlreadyExists,
                format!("object {path} already exists"),
            ));
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, data)?;
        Ok(())
    }

    fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full = self.resolve(path)?;
        fs::read(&full).map_err(|err| {
            let mut mapped = StoreError::from(err);
            mapped.message = format!("{path}: {}", mapped.message);
            mapped
        })
    }

    fn mkdirs(&self, path: &str) -> StoreResult<()> {
        let full = self.resolve(path)?;
        fs::create_dir_all(&full)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.resolve(path)?.exists())
    }

    fn list(&self, path: &str) -> StoreResult<Vec<String>> {
        let full = self.resolve(path)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&full)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
