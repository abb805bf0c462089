//! New command - create a post at the head of the list

use super::read_content;
use crate::audit::AuditLog;
use crate::auth::Authorizer;
use crate::cli::args::NewArgs;
use crate::config::Config;
use crate::error::QuireResult;
use crate::store::{PostDraft, PostStore};
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the new command
pub async fn execute(args: NewArgs, config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    gate.authorize().await?;
    let ctx = UiContext::detect();

    let content = read_content(&args.fields).await?.unwrap_or_default();
    let fields = &args.fields;
    let draft = PostDraft::new(
        &args.title,
        fields.description.as_deref().unwrap_or_default(),
        fields.tags.as_deref().unwrap_or_default(),
        fields.image.as_deref().unwrap_or_default(),
        content,
    );

    let store = PostStore::from_config(config);
    let post = store.create(draft).await?;

    AuditLog::new(config)
        .log(
            "post.created",
            &json!({ "slug": post.slug, "title": post.title }),
        )
        .await;

    ui::step_ok_detail(&ctx, "Post added successfully!", &post.slug);
    Ok(())
}
