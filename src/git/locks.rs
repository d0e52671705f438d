use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One mutex per working directory, so write operations against the same
/// repository run one at a time while different repositories stay parallel
#[derive(Debug, Default)]
pub struct DirectoryLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

/// Held for the duration of one write operation
pub struct DirectoryGuard {
    _guard: parking_lot::ArcMutexGuard<parking_lot::RawMutex, ()>,
}

impl DirectoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other write operation holds `dir`
    pub fn lock(&self, dir: &Path) -> DirectoryGuard {
        let mutex = self.entry(dir);
        DirectoryGuard {
            _guard: mutex.lock_arc(),
        }
    }

    /// Non-blocking variant of [`DirectoryLocks::lock`]
    pub fn try_lock(&self, dir: &Path) -> Option<DirectoryGuard> {
        let mutex = self.entry(dir);
        mutex.try_lock_arc().map(|guard| DirectoryGuard { _guard: guard })
    }

    fn entry(&self, dir: &Path) -> Arc<Mutex<()>> {
        let key = Self::key(dir);
        let mut locks: MutexGuard<'_, _> = self.locks.lock();
        // Only the map holds an unused mutex; clones are handed out under this lock
        locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        locks.entry(key).or_default().clone()
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().len()
    }

    /// `repo`, `repo/` and `./repo` must share one lock
    fn key(dir: &Path) -> PathBuf {
        dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
    }
}
