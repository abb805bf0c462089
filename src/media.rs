//! Image uploads into the media directory
//!
//! Independent of the post store: images are referenced from post content by
//! URL and never tracked in the index.

use crate::error::{QuireError, QuireResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Largest accepted upload, in bytes
pub const MAX_IMAGE_BYTES: u64 = 5_000_000;

/// Accepted file extensions (lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Media directory handle
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy an image into the library and return its stored path
    ///
    /// The file name is sanitized and suffixed `_1`, `_2`, ... if taken.
    pub async fn import(&self, source: &Path) -> QuireResult<PathBuf> {
        let original = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let reject = |reason: &str| QuireError::MediaRejected {
            file: original.clone(),
            reason: reason.to_string(),
        };

        let meta = fs::metadata(source)
            .await
            .map_err(|e| QuireError::io(format!("reading {}", source.display()), e))?;
        if !meta.is_file() {
            return Err(reject("not a regular file"));
        }

        let filename = sanitize_filename(&original);
        if !has_image_extension(&filename) {
            return Err(reject("only JPG, JPEG, PNG, GIF & WEBP files are allowed"));
        }
        if meta.len() > MAX_IMAGE_BYTES {
            return Err(reject("your file is too large (max 5MB)"));
        }

        let bytes = fs::read(source)
            .await
            .map_err(|e| QuireError::io(format!("reading {}", source.display()), e))?;
        if !looks_like_image(&bytes) {
            return Err(reject("file is not an image"));
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| QuireError::io(format!("creating {}", self.dir.display()), e))?;

        let target = self.free_path(&filename).await;
        fs::write(&target, &bytes)
            .await
            .map_err(|e| QuireError::io(format!("writing {}", target.display()), e))?;

        info!("Uploaded image {}", target.display());
        Ok(target)
    }

    /// Image files currently in the library, sorted by name
    pub async fn list(&self) -> QuireResult<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(QuireError::io("reading images directory", e)),
        };

        let mut images = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| QuireError::io("reading image entry", e))?
        {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_file() && has_image_extension(&name) {
                images.push(path);
            }
        }

        images.sort();
        Ok(images)
    }

    /// Number of images in the library
    pub async fn count(&self) -> QuireResult<usize> {
        Ok(self.list().await?.len())
    }

    async fn free_path(&self, filename: &str) -> PathBuf {
        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{}", ext)),
            None => (filename, String::new()),
        };

        let mut candidate = self.dir.join(filename);
        let mut counter = 1;
        while fs::try_exists(&candidate).await.unwrap_or(false) {
            candidate = self.dir.join(format!("{}_{}{}", stem, counter, ext));
            counter += 1;
        }
        candidate
    }
}

/// Replace everything outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check the leading magic bytes for JPEG, PNG, GIF or WebP
pub fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(b"\x89PNG\r\n\x1a\n")
        || bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
        || (bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP")
}
