//! Edit command - update a post in place

use super::read_content;
use crate::audit::AuditLog;
use crate::auth::Authorizer;
use crate::cli::args::EditArgs;
use crate::config::Config;
use crate::error::{QuireError, QuireResult};
use crate::store::{PostDraft, PostStore};
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the edit command
pub async fn execute(args: EditArgs, config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    gate.authorize().await?;
    let ctx = UiContext::detect();

    let store = PostStore::from_config(config);
    let current = store
        .find_by_slug(&args.slug)
        .await?
        .ok_or_else(|| QuireError::PostNotFound(args.slug.clone()))?;

    let content = match read_content(&args.fields).await? {
        Some(content) => content,
        None if store.content().exists(&current.slug).await => {
            store.load_content(&current.slug).await
        }
        None => String::new(),
    };

    let fields = &args.fields;
    let current_tags = current.tags.join(",");
    let draft = PostDraft::new(
        args.title.as_deref().unwrap_or(&current.title),
        fields.description.as_deref().unwrap_or(&current.description),
        fields.tags.as_deref().unwrap_or(&current_tags),
        fields
            .image
            .as_deref()
            .or(current.featured_image.as_deref())
            .unwrap_or_default(),
        content,
    );

    let post = store.update(&args.slug, draft).await?;

    AuditLog::new(config)
        .log(
            "post.updated",
            &json!({ "slug": post.slug, "previous_slug": args.slug }),
        )
        .await;

    if post.slug != args.slug {
        ui::step_ok_detail(
            &ctx,
            "Post updated successfully!",
            &format!("{} -> {}", args.slug, post.slug),
        );
    } else {
        ui::step_ok_detail(&ctx, "Post updated successfully!", &post.slug);
    }
    Ok(())
}
