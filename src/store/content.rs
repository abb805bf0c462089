//! Per-post content files (`<slug>.html`)

use crate::error::{QuireError, QuireResult};
use crate::store::slug::is_valid_slug;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Returned by `load` when a post has no readable content file
pub const CONTENT_PLACEHOLDER: &str = "<p>Post content not available.</p>";

/// Directory of content files keyed by slug
#[derive(Debug, Clone)]
pub struct ContentDir {
    dir: PathBuf,
}

impl ContentDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the content file for `slug`
    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.html", slug))
    }

    /// Read the raw markup, or the placeholder if it cannot be read
    pub async fn load(&self, slug: &str) -> String {
        if !is_valid_slug(slug) {
            return CONTENT_PLACEHOLDER.to_string();
        }
        let path = self.path_for(slug);
        match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("No content for {} at {}: {}", slug, path.display(), e);
                CONTENT_PLACEHOLDER.to_string()
            }
        }
    }

    /// Write raw markup for `slug`, creating the directory if needed
    ///
    /// Any IO failure surfaces as `ContentWrite`.
    pub async fn write(&self, slug: &str, content: &str) -> QuireResult<()> {
        let path = self.path_for(slug);
        let result = async {
            fs::create_dir_all(&self.dir).await?;
            fs::write(&path, content).await
        }
        .await;

        result.map_err(|source| QuireError::ContentWrite {
            slug: slug.to_string(),
            path,
            source,
        })
    }

    /// Whether a content file exists for `slug`
    pub async fn exists(&self, slug: &str) -> bool {
        fs::metadata(self.path_for(slug))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Remove the content file for `slug`; failures are logged, not returned
    pub async fn remove_best_effort(&self, slug: &str) -> bool {
        let path = self.path_for(slug);
        match fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Could not remove content file {}: {}", path.display(), e);
                false
            }
        }
    }
}
