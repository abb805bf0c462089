//! Login, logout and passwd commands

use super::config::{target_path, write_key};
use crate::audit::AuditLog;
use crate::auth::{hash_password, Authorizer, SessionGate};
use crate::cli::args::{LoginArgs, PasswdArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{QuireError, QuireResult};
use crate::store::PostStore;
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the login command
pub async fn login(args: LoginArgs, config: &Config, gate: &SessionGate) -> QuireResult<()> {
    let ctx = UiContext::detect();

    let password = match args.password {
        Some(password) => password,
        None => ui::password(&ctx, "Admin password").await?,
    };

    ConfigManager::ensure_state_dir().await?;
    let session = gate.login(&password).await?;

    AuditLog::new(config)
        .log("admin.login", &json!({ "token": session.token }))
        .await;

    ui::step_ok_detail(
        &ctx,
        "Logged in",
        &format!("until {}", session.expires_at.format("%Y-%m-%d %H:%M UTC")),
    );
    Ok(())
}

/// Execute the logout command
///
/// The read cache is cleared along with the session.
pub async fn logout(config: &Config, gate: &SessionGate) -> QuireResult<()> {
    let ctx = UiContext::detect();

    let had_session = gate.logout().await?;
    PostStore::from_config(config).clear_cache().await?;

    if had_session {
        AuditLog::new(config).log("admin.logout", &json!({})).await;
        ui::step_ok(&ctx, "Logged out");
    } else {
        ui::step_info(&ctx, "No active session");
    }
    Ok(())
}

/// Execute the passwd command
///
/// Changing an existing password needs an open session; setting the first
/// one does not.
pub async fn passwd(
    args: PasswdArgs,
    config: &Config,
    manager: &ConfigManager,
    gate: &dyn Authorizer,
) -> QuireResult<()> {
    if !config.admin.password_hash.is_empty() {
        gate.authorize().await?;
    }
    let ctx = UiContext::detect();

    let password = match args.password {
        Some(password) => password,
        None => {
            let first = ui::password(&ctx, "New admin password").await?;
            let again = ui::password(&ctx, "Repeat password").await?;
            if first != again {
                return Err(QuireError::validation("passwords do not match"));
            }
            first
        }
    };
    if password.is_empty() {
        return Err(QuireError::validation("password cannot be empty"));
    }

    let path = target_path(manager, args.local)?;
    write_key(
        &path,
        "admin.password_hash",
        toml_edit::value(hash_password(&password)),
    )
    .await?;

    AuditLog::new(config)
        .log("admin.password_changed", &json!({ "path": path }))
        .await;

    ui::step_ok_detail(&ctx, "Admin password set", &path.display().to_string());
    Ok(())
}
