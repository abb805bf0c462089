//! CLI command implementations
//!
//! Every command reports one status line. Mutating commands take an
//! [`Authorizer`] and refuse to touch the store without an admin session.

pub mod auth;
pub mod cache;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod media;
pub mod new;
pub mod reorder;
pub mod search;
pub mod show;
pub mod stats;

pub use auth::{login, logout, passwd};
pub use cache::execute as cache;
pub use completions::execute as completions;
pub use config::execute as config;
pub use delete::execute as delete;
pub use edit::execute as edit;
pub use list::execute as list;
pub use media::{images, upload};
pub use new::execute as new;
pub use reorder::{move_post, shuffle};
pub use search::execute as search;
pub use show::execute as show;
pub use stats::execute as stats;

use crate::cli::args::PostFields;
use crate::config::Config;
use crate::error::{QuireError, QuireResult};
use crate::store::{Post, PostStore};
use tokio::fs;
use tracing::debug;

/// Posts for read-only commands, served from the read cache when enabled
pub(crate) async fn read_posts(config: &Config, store: &PostStore) -> QuireResult<Vec<Post>> {
    match store.cache() {
        Some(cache) if config.cache.enabled => Ok(cache.get().await?.posts),
        _ => {
            debug!("Read cache disabled, reading index directly");
            store.list().await
        }
    }
}

/// Content given on the command line, or read from `--content-file`
pub(crate) async fn read_content(fields: &PostFields) -> QuireResult<Option<String>> {
    if let Some(ref path) = fields.content_file {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| QuireError::io(format!("reading {}", path.display()), e))?;
        return Ok(Some(content));
    }
    Ok(fields.content.clone())
}
