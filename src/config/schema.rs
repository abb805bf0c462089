//! Configuration schema for quire
//!
//! Global configuration lives at `~/.config/quire/config.toml`; a project-local
//! `quire.toml` may override any key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Site identity and layout
    pub site: SiteConfig,

    /// On-disk layout of the store
    pub storage: StorageConfig,

    /// Read cache settings
    pub cache: CacheConfig,

    /// Admin gate settings
    pub admin: AdminConfig,
}

impl Config {
    /// Resolve a storage path against the site root
    pub fn site_path(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.site.root.join(relative)
        }
    }

    /// Path of the post index document
    pub fn index_path(&self) -> PathBuf {
        self.site_path(&self.storage.index_file)
    }

    /// Directory holding `<slug>.html` content files
    pub fn posts_dir(&self) -> PathBuf {
        self.site_path(&self.storage.posts_dir)
    }

    /// Directory holding uploaded images
    pub fn images_dir(&self) -> PathBuf {
        self.site_path(&self.storage.images_dir)
    }

    /// Path of the read cache snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.site_path(&self.storage.cache_dir).join("posts.cache")
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Record admin actions to the audit log
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { audit_log: true }
    }
}

/// Site settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory all storage paths are relative to
    pub root: PathBuf,

    /// Site title
    pub title: String,

    /// Site description
    pub description: String,

    /// Posts per page in listings
    pub posts_per_page: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            title: "Quire - Flat-File Blog".to_string(),
            description: "A minimal flat-file blog.".to_string(),
            posts_per_page: 25,
        }
    }
}

/// Storage layout, relative to `site.root`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Post index document
    pub index_file: PathBuf,

    /// Content file directory
    pub posts_dir: PathBuf,

    /// Uploaded image directory
    pub images_dir: PathBuf,

    /// Read cache directory
    pub cache_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_file: PathBuf::from("posts.json"),
            posts_dir: PathBuf::from("posts"),
            images_dir: PathBuf::from("images"),
            cache_dir: PathBuf::from("cache"),
        }
    }
}

/// Read cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve reads through the snapshot (default: true)
    pub enabled: bool,

    /// Snapshot lifetime in hours
    pub ttl_hours: u64,
}

impl CacheConfig {
    /// Snapshot lifetime as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 3600)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: 24,
        }
    }
}

/// Admin gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// `salt$sha256hex` password hash, empty until `quire passwd` is run
    pub password_hash: String,

    /// Session lifetime in hours
    pub session_ttl_hours: u32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password_hash: String::new(),
            session_ttl_hours: 12,
        }
    }
}
