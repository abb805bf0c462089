//! Index document persistence
//!
//! The index is read and written wholesale. Writes go to a temp file in the
//! same directory and are renamed over the target, so readers never see a
//! half-written document.

use crate::error::{QuireError, QuireResult};
use crate::store::post::IndexDocument;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// Handle on the index document file
#[derive(Debug, Clone)]
pub struct IndexFile {
    path: PathBuf,
}

impl IndexFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; a missing file reads as an empty index
    pub async fn load(&self) -> QuireResult<IndexDocument> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Index {} not found, using empty index", self.path.display());
                return Ok(IndexDocument::default());
            }
            Err(e) => {
                return Err(QuireError::io(
                    format!("reading post index {}", self.path.display()),
                    e,
                ))
            }
        };

        if content.trim().is_empty() {
            return Ok(IndexDocument::default());
        }

        serde_json::from_str(&content).map_err(|e| QuireError::IndexRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Replace the document on disk
    ///
    /// Any IO failure surfaces as `IndexWrite`.
    pub async fn save(&self, doc: &IndexDocument) -> QuireResult<()> {
        let content = serde_json::to_string_pretty(doc)?;
        write_atomic(&self.path, content.as_bytes())
            .await
            .map_err(|source| QuireError::IndexWrite {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "Wrote index {} ({} posts)",
            self.path.display(),
            doc.posts.len()
        );
        Ok(())
    }
}

/// Write `bytes` to a sibling temp file, fsync it and rename it over `path`
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    let tmp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let result = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp).await;
    }
    result
}
