//! Cache command - inspect or clear the read cache snapshot

use crate::audit::AuditLog;
use crate::auth::Authorizer;
use crate::cache::{ReadCache, SnapshotState};
use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::Config;
use crate::error::QuireResult;
use crate::store::{IndexFile, PostStore};
use crate::ui::{self, UiContext};
use serde_json::json;
use std::time::Duration;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    match args.action {
        CacheAction::Status => status(config).await,
        CacheAction::Clear => clear(config, gate).await,
    }
}

async fn status(config: &Config) -> QuireResult<()> {
    let ctx = UiContext::detect();
    let cache = ReadCache::new(
        config.snapshot_path(),
        IndexFile::new(config.index_path()),
        config.cache.ttl(),
    );

    ui::intro(&ctx, "Read cache");
    ui::key_value_status(
        &ctx,
        "enabled",
        if config.cache.enabled { "yes" } else { "no" },
        config.cache.enabled,
    );

    let state = cache.state().await;
    ui::key_value_status(
        &ctx,
        "snapshot",
        &state.to_string(),
        state == SnapshotState::Fresh,
    );
    ui::key_value(&ctx, "path", &cache.snapshot_path().display().to_string());
    if let Some(age) = cache.age().await {
        ui::key_value(&ctx, "age", &format_duration(age));
    }
    ui::key_value(&ctx, "ttl", &format_duration(cache.ttl()));

    Ok(())
}

async fn clear(config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    gate.authorize().await?;
    let ctx = UiContext::detect();

    PostStore::from_config(config).clear_cache().await?;

    AuditLog::new(config).log("cache.cleared", &json!({})).await;
    ui::step_ok(&ctx, "Cache cleared successfully!");
    Ok(())
}

/// Format a duration as `1h 5m`, `5m 3s` or `42s`
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
