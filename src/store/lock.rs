//! Single-writer lock around index mutations
//!
//! Two layers: an in-process async mutex per index path, and an advisory
//! `flock` on `<index>.lock` so separate processes are serialized as well.

use crate::error::{QuireError, QuireResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

type Registry = Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>;

fn registry() -> &'static Registry {
    static WRITERS: OnceLock<Registry> = OnceLock::new();
    WRITERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Held for the duration of one mutation; released on drop
///
/// The last guard for an index path also removes that path's mutex from
/// the registry, so it only holds paths with a writer or waiter.
#[derive(Debug)]
pub struct WriterGuard {
    local: Option<OwnedMutexGuard<()>>,
    key: PathBuf,
    _file: std::fs::File,
    path: PathBuf,
}

impl WriterGuard {
    /// Path of the lock file backing this guard
    pub fn lock_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriterGuard {
    fn drop(&mut self) {
        drop(self.local.take());

        // A poisoned registry only means an entry lingers.
        if let Ok(mut writers) = registry().lock() {
            let idle = writers
                .get(&self.key)
                .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
            if idle {
                writers.remove(&self.key);
            }
        }
    }
}

/// Lock file path for an index document
pub fn lock_path_for(index: &Path) -> PathBuf {
    let mut name = index
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    index.with_file_name(name)
}

/// Acquire the writer lock for `index`, waiting if another writer holds it
pub async fn acquire(index: &Path) -> QuireResult<WriterGuard> {
    let key = std::path::absolute(index).unwrap_or_else(|_| index.to_path_buf());

    let mutex = {
        let mut writers = registry()
            .lock()
            .map_err(|_| QuireError::User("writer lock registry poisoned".to_string()))?;
        Arc::clone(writers.entry(key.clone()).or_default())
    };
    let local = mutex.lock_owned().await;

    let path = lock_path_for(index);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| QuireError::LockFailed {
                path: path.clone(),
                source,
            })?;
    }

    let lock_file = path.clone();
    let file = tokio::task::spawn_blocking(move || lock_exclusive(&lock_file))
        .await
        .map_err(|e| QuireError::User(format!("lock task failed: {}", e)))?
        .map_err(|source| QuireError::LockFailed {
            path: path.clone(),
            source,
        })?;

    debug!("Acquired writer lock {}", path.display());
    Ok(WriterGuard {
        local: Some(local),
        key,
        _file: file,
        path,
    })
}

#[cfg(unix)]
fn lock_exclusive(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::io::AsRawFd;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;

    // SAFETY: `flock` only takes the descriptor number. `file` owns that
    // descriptor and is not dropped until after the call returns (it is
    // moved into the result), so the fd cannot be closed or reused while
    // `flock` runs.
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // The lock is released when the descriptor is closed.
    Ok(file)
}

#[cfg(not(unix))]
fn lock_exclusive(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
}
