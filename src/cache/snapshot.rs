//! Time-boxed snapshot of the index document

use crate::error::{QuireError, QuireResult};
use crate::store::index::{write_atomic, IndexFile};
use crate::store::lock;
use crate::store::post::IndexDocument;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, warn};

/// Default snapshot lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifecycle of the single cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    /// No snapshot on disk
    Absent,
    /// Snapshot younger than the TTL
    Fresh,
    /// Snapshot at or past the TTL, rebuilt on next read
    Stale,
}

impl fmt::Display for SnapshotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Absent => "absent",
            Self::Fresh => "fresh",
            Self::Stale => "stale",
        };
        write!(f, "{}", name)
    }
}

/// Read-through cache over the canonical index
#[derive(Debug, Clone)]
pub struct ReadCache {
    snapshot: PathBuf,
    index: IndexFile,
    ttl: Duration,
}

impl ReadCache {
    pub fn new(snapshot: impl Into<PathBuf>, index: IndexFile, ttl: Duration) -> Self {
        Self {
            snapshot: snapshot.into(),
            index,
            ttl,
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Age of the snapshot, measured from its modification time
    pub async fn age(&self) -> Option<Duration> {
        let modified = fs::metadata(&self.snapshot).await.ok()?.modified().ok()?;
        // A clock that moved backwards counts as brand new.
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Current state of the slot
    pub async fn state(&self) -> SnapshotState {
        match self.age().await {
            None => SnapshotState::Absent,
            Some(age) if age < self.ttl => SnapshotState::Fresh,
            Some(_) => SnapshotState::Stale,
        }
    }

    /// Return the snapshot if fresh, otherwise rebuild it from the index
    pub async fn get(&self) -> QuireResult<IndexDocument> {
        if self.state().await == SnapshotState::Fresh {
            match self.read_snapshot().await {
                Ok(doc) => {
                    debug!("Cache hit {}", self.snapshot.display());
                    return Ok(doc);
                }
                Err(e) => warn!("Discarding unreadable snapshot: {}", e),
            }
        }

        debug!("Cache miss, rebuilding {}", self.snapshot.display());
        self.rebuild().await
    }

    /// Rebuild the snapshot from the canonical index unconditionally
    ///
    /// Holds the writer lock while reading the index and writing the
    /// snapshot, so a mutation cannot land in between and have its
    /// invalidation overwritten with the older document. Without the lock
    /// the index is still returned but no snapshot is written.
    pub async fn rebuild(&self) -> QuireResult<IndexDocument> {
        let _guard = match lock::acquire(self.index.path()).await {
            Ok(guard) => guard,
            Err(e) => {
                warn!("Not persisting snapshot, writer lock unavailable: {}", e);
                return self.index.load().await;
            }
        };
        let doc = self.index.load().await?;

        let content = serde_json::to_string(&doc)?;
        if let Err(e) = write_atomic(&self.snapshot, content.as_bytes()).await {
            warn!(
                "Could not persist snapshot {}: {}",
                self.snapshot.display(),
                e
            );
        }

        Ok(doc)
    }

    /// Drop the snapshot; the next `get` rebuilds
    pub async fn invalidate(&self) -> QuireResult<()> {
        match fs::remove_file(&self.snapshot).await {
            Ok(()) => {
                debug!("Invalidated snapshot {}", self.snapshot.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(QuireError::io(
                format!("removing snapshot {}", self.snapshot.display()),
                e,
            )),
        }
    }

    async fn read_snapshot(&self) -> QuireResult<IndexDocument> {
        let content = fs::read_to_string(&self.snapshot).await.map_err(|e| {
            QuireError::io(format!("reading snapshot {}", self.snapshot.display()), e)
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
