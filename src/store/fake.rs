//! In-memory store for tests.

use super::{ErrorKind, RemoteStore, StoreError, StoreResult};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory [`RemoteStore`] with scripted failure injection.
///
/// All state sits behind a mutex so one fake can be shared across worker
/// threads. [`fail_next`](Self::fail_next) queues error kinds consumed by
/// the next operations of any kind; [`fail_puts`](Self::fail_puts) targets
/// uploads only, which is how tests exercise the retry policy without
/// breaking the initial `mkdirs`.
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    objects: BTreeMap<String, Vec<u8>>,
    dirs: HashSet<String>,
    failures: VecDeque<ErrorKind>,
    put_failures: VecDeque<ErrorKind>,
}

impl FakeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `times` failures of `kind`, consumed one per store call.
    pub fn fail_next(&self, kind: ErrorKind, times: usize) {
        let mut inner = self.lock();
        for _ in 0..times {
            inner.failures.push_back(kind);
        }
    }

    /// Queue `times` failures of `kind`, consumed only by `put` calls.
    pub fn fail_puts(&self, kind: ErrorKind, times: usize) {
        let mut inner = self.lock();
        for _ in 0..times {
            inner.put_failures.push_back(kind);
        }
    }

    /// Total number of stored objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }

    fn check_failure(inner: &mut Inner, op: &str) -> StoreResult<()> {
        if let Some(kind) = inner.failures.pop_front() {
            return Err(StoreError::new(kind, format!("injected {op} failure")));
        }
        Ok(())
    }

    fn normalize(path: &str) -> String {
        format!("/{}", path.trim_matches('/'))
    }
}

impl RemoteStore for FakeStore {
    fn put(&self, path: &str, data: &[u8], overwrite: bool) -> StoreResult<()> {
        let mut inner = self.lock();
        Self::check_failure(&mut inner, "put")?;
        if let Some(kind) = inner.put_failures.pop_front() {
            return Err(StoreError::new(kind, "injected put failure"));
        }
        let key = Self::normalize(path);
        if !overwrite && inner.objects.contains_key(&key) {
            return Err(StoreError::new(
                ErrorKind::AlreadyExists,
                format!("object {path} already exists"),
            ));
        }
        inner.objects.insert(key, data.to_vec());
        Ok(())
    }

    fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let mut inner = self.lock();
        Self::check_failure(&mut inner, "get")?;
        let key = Self::normalize(path);
        inner
            .objects
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::new(ErrorKind::NotFound, format!("object {path} not found")))
    }

    fn mkdirs(&self, path: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        Self::check_failure(&mut inner, "mkdirs")?;
        let key = Self::normalize(path);
        inner.dirs.insert(key);
        Ok(())
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        let mut inner = self.lock();
        Self::check_failure(&mut inner, "exists")?;
        let key = Self::normalize(path);
        Ok(inner.objects.contains_key(&key) || inner.dirs.contains(&key))
    }

    fn list(&self, path: &str) -> StoreResult<Vec<String>> {
        let mut inner = self.lock();
        Self::check_failure(&mut inner, "list")?;
        let prefix = format!("{}/", Self::normalize(path));
        // BTreeMap iteration keeps the result sorted.
        let names = inner
            .objects
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect();
        Ok(names)
    }
}
