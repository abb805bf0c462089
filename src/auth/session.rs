//! Admin sessions persisted in the state directory

use crate::auth::password::verify_password;
use crate::config::schema::AdminConfig;
use crate::config::ConfigManager;
use crate::error::{QuireError, QuireResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Proof that the caller logged in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// Random session token
    pub token: Uuid,

    /// When the session was opened
    pub created_at: DateTime<Utc>,

    /// When the session stops being valid
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Open a session lasting `ttl`
    pub fn new(ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: Uuid::new_v4(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if the session is past its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Gate in front of every store mutation
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Return the active session or fail with an auth error
    async fn authorize(&self) -> QuireResult<AdminSession>;
}

/// File-backed login gate
pub struct SessionGate {
    session_path: PathBuf,
    password_hash: String,
    ttl: Duration,
}

impl SessionGate {
    /// Create a gate using the default session file
    pub fn new(config: &AdminConfig) -> Self {
        Self::with_path(ConfigManager::session_path(), config)
    }

    /// Create a gate with a custom session file
    pub fn with_path(session_path: PathBuf, config: &AdminConfig) -> Self {
        Self {
            session_path,
            password_hash: config.password_hash.clone(),
            ttl: Duration::hours(i64::from(config.session_ttl_hours)),
        }
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Verify the password and persist a new session
    pub async fn login(&self, password: &str) -> QuireResult<AdminSession> {
        if self.password_hash.is_empty() {
            return Err(QuireError::PasswordNotConfigured);
        }
        if !verify_password(password, &self.password_hash) {
            warn!("Rejected admin login");
            return Err(QuireError::InvalidPassword);
        }

        let session = AdminSession::new(self.ttl);
        self.save(&session).await?;
        info!("Admin session opened until {}", session.expires_at);
        Ok(session)
    }

    /// Remove the session file; returns whether a session existed
    pub async fn logout(&self) -> QuireResult<bool> {
        match fs::remove_file(&self.session_path).await {
            Ok(()) => {
                info!("Admin session closed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(QuireError::io(
                format!("removing session file {}", self.session_path.display()),
                e,
            )),
        }
    }

    /// Load the stored session, if any; unreadable files count as none
    pub async fn current(&self) -> QuireResult<Option<AdminSession>> {
        let content = match fs::read_to_string(&self.session_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(QuireError::io(
                    format!("reading session file {}", self.session_path.display()),
                    e,
                ))
            }
        };

        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Ignoring corrupt session file: {}", e);
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &AdminSession) -> QuireResult<()> {
        if let Some(parent) = self.session_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| QuireError::io("creating state directory", e))?;
        }

        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.session_path, content).await.map_err(|e| {
            QuireError::io(
                format!("writing session file {}", self.session_path.display()),
                e,
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.session_path, perms)
                .map_err(|e| QuireError::io("setting session file permissions", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl Authorizer for SessionGate {
    async fn authorize(&self) -> QuireResult<AdminSession> {
        let session = self.current().await?.ok_or(QuireError::NotAuthenticated)?;

        if session.is_expired() {
            debug!("Admin session expired at {}", session.expires_at);
            self.logout().await?;
            return Err(QuireError::SessionExpired);
        }

        Ok(session)
    }
}
