//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{QuireError, QuireResult};

/// Ask for confirmation; non-interactive runs get `default`, `--yes` gets true
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> QuireResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| QuireError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| QuireError::User(format!("Prompt failed: {}", e)))
}

/// Read a password without echo
///
/// Fails in non-interactive mode; callers pass `--password` or the
/// `QUIRE_PASSWORD` variable there instead.
pub async fn password(ctx: &UiContext, message: &str) -> QuireResult<String> {
    if !ctx.is_interactive() {
        return Err(QuireError::User(
            "No terminal for a password prompt; pass --password or set QUIRE_PASSWORD".to_string(),
        ));
    }

    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::password(&message)
            .mask('▪')
            .validate(|input: &String| {
                if input.is_empty() {
                    Err("Password cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact()
    })
    .await
    .map_err(|e| QuireError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| QuireError::User(format!("Prompt failed: {}", e)))
}
