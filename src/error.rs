//! Error types for quire
//!
//! All modules use `QuireResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for quire operations
pub type QuireResult<T> = Result<T, QuireError>;

/// All errors that can occur in quire
#[derive(Error, Debug)]
pub enum QuireError {
    // Input errors
    #[error("Invalid input: {0}")]
    Validation(String),

    // Store errors
    #[error("Failed to write post index {path}: {source}")]
    IndexWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read post index {path}: {reason}")]
    IndexRead { path: PathBuf, reason: String },

    #[error("Failed to write content for post {slug} at {path}: {source}")]
    ContentWrite {
        slug: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Failed to acquire writer lock {path}: {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed and could not be undone: {reason}")]
    RollbackFailed {
        step: &'static str,
        reason: String,
        #[source]
        source: Box<QuireError>,
    },

    // Admin session errors
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Admin session expired")]
    SessionExpired,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Admin password is not configured")]
    PasswordNotConfigured,

    // Media errors
    #[error("Image rejected: {file}: {reason}")]
    MediaRejected { file: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML edit error: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    // General errors
    #[error("{0}")]
    User(String),
}

impl QuireError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Whether the error means the caller has to log in again
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::SessionExpired | Self::InvalidPassword
        )
    }

    /// One-line status message shown to the admin after a failed action
    pub fn status_message(&self) -> String {
        match self {
            Self::IndexWrite { .. } => "Error: Could not write to the post index!".to_string(),
            Self::ContentWrite { slug, .. } => {
                format!("Error: Could not write the content file for '{}'!", slug)
            }
            Self::RollbackFailed { .. } => {
                "Error: Could not write the post and could not restore the post index; it may list a post without content!".to_string()
            }
            Self::PostNotFound(slug) => format!("Error: No post with slug '{}'", slug),
            Self::NotAuthenticated | Self::SessionExpired => {
                "Error: Admin login required".to_string()
            }
            Self::InvalidPassword => "Error: Invalid password".to_string(),
            Self::MediaRejected { reason, .. } => format!("Sorry, {}", reason),
            other => format!("Error: {}", other),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotAuthenticated | Self::SessionExpired => Some("Run: quire login"),
            Self::PasswordNotConfigured => Some("Run: quire passwd"),
            Self::IndexWrite { .. } => Some("Check that the site root is writable"),
            Self::ContentWrite { .. } => {
                Some("Check the posts directory permissions, then re-run: quire edit <slug>")
            }
            Self::RollbackFailed { .. } => {
                Some("Run: quire list, then remove the broken entry with: quire delete <slug>")
            }
            Self::ConfigInvalid { .. } => Some("Run: quire config show"),
            _ => None,
        }
    }
}
