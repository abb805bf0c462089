//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, LOCAL_CONFIG_FILE};
use crate::error::{QuireError, QuireResult};
use crate::ui::{self, UiContext};
use std::path::{Path, PathBuf};
use tokio::fs;
use toml_edit::{DocumentMut, Item};
use tracing::info;

/// How a config key's value is typed in TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Bool,
    Integer,
    Text,
}

/// Keys accepted by `config set`
const SETTABLE_KEYS: &[(&str, KeyKind)] = &[
    ("general.audit_log", KeyKind::Bool),
    ("site.root", KeyKind::Text),
    ("site.title", KeyKind::Text),
    ("site.description", KeyKind::Text),
    ("site.posts_per_page", KeyKind::Integer),
    ("storage.index_file", KeyKind::Text),
    ("storage.posts_dir", KeyKind::Text),
    ("storage.images_dir", KeyKind::Text),
    ("storage.cache_dir", KeyKind::Text),
    ("cache.enabled", KeyKind::Bool),
    ("cache.ttl_hours", KeyKind::Integer),
    ("admin.session_ttl_hours", KeyKind::Integer),
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> QuireResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, local }) => {
            let ctx = UiContext::detect();
            let item = parse_value(&key, &value)?;
            let path = target_path(manager, local)?;
            write_key(&path, &key, item).await?;
            ui::step_ok(
                &ctx,
                &format!("Set {} = {} in {}", key, value, path.display()),
            );
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> QuireResult<()> {
    let mut shown = config.clone();
    if !shown.admin.password_hash.is_empty() {
        shown.admin.password_hash = "<set>".to_string();
    }
    println!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> QuireResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

/// Global config file, or `quire.toml` in the working directory
pub(crate) fn target_path(manager: &ConfigManager, local: bool) -> QuireResult<PathBuf> {
    if local {
        let cwd = std::env::current_dir()
            .map_err(|e| QuireError::io("getting current directory", e))?;
        Ok(cwd.join(LOCAL_CONFIG_FILE))
    } else {
        Ok(manager.path().to_path_buf())
    }
}

/// Parse `value` according to the type of `key`
fn parse_value(key: &str, value: &str) -> QuireResult<Item> {
    let kind = SETTABLE_KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| {
            let valid: Vec<&str> = SETTABLE_KEYS.iter().map(|(name, _)| *name).collect();
            QuireError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                valid.join(", ")
            ))
        })?;

    match kind {
        KeyKind::Bool => parse_bool(value).map(toml_edit::value),
        KeyKind::Integer => value
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .map(toml_edit::value)
            .ok_or_else(|| QuireError::User(format!("Invalid number: {}", value))),
        KeyKind::Text => Ok(toml_edit::value(value)),
    }
}

/// Set a dot-separated key in a TOML file, keeping its comments and layout
///
/// The edited document must still deserialize as a [`Config`] before it
/// is written back.
pub(crate) async fn write_key(path: &Path, key: &str, item: Item) -> QuireResult<()> {
    let mut doc = if path.exists() {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| QuireError::io(format!("reading {}", path.display()), e))?;
        content.parse::<DocumentMut>()?
    } else {
        DocumentMut::new()
    };

    set_item(&mut doc, key, item)?;

    let content = doc.to_string();
    toml::from_str::<Config>(&content).map_err(|e| QuireError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| QuireError::ConfigDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    fs::write(path, content)
        .await
        .map_err(|e| QuireError::io(format!("writing {}", path.display()), e))?;

    info!("Updated {} in {}", key, path.display());
    Ok(())
}

fn set_item(doc: &mut DocumentMut, key: &str, item: Item) -> QuireResult<()> {
    let (parents, leaf) = key
        .rsplit_once('.')
        .ok_or_else(|| QuireError::User(format!("Expected section.key, got: {}", key)))?;

    let mut table = doc.as_table_mut();
    for part in parents.split('.') {
        table = table
            .entry(part)
            .or_insert(toml_edit::table())
            .as_table_mut()
            .ok_or_else(|| QuireError::User(format!("Expected table at key: {}", part)))?;
    }

    table.insert(leaf, item);
    Ok(())
}

fn parse_bool(value: &str) -> QuireResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(QuireError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}
