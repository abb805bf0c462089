//! Delete command - remove a post and its content file

use crate::audit::AuditLog;
use crate::auth::Authorizer;
use crate::cli::args::DeleteArgs;
use crate::config::Config;
use crate::error::QuireResult;
use crate::store::PostStore;
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the delete command
pub async fn execute(args: DeleteArgs, config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    gate.authorize().await?;
    let ctx = UiContext::detect().with_auto_yes(args.yes);

    let confirmed = ui::confirm(
        &ctx,
        &format!("Delete post '{}'? This cannot be undone", args.slug),
        false,
    )
    .await?;
    if !confirmed {
        ui::step_warn_hint(&ctx, "Delete cancelled", "Use --yes to skip confirmation");
        return Ok(());
    }

    let store = PostStore::from_config(config);
    let post = store.delete(&args.slug).await?;

    AuditLog::new(config)
        .log("post.deleted", &json!({ "slug": post.slug }))
        .await;

    ui::step_ok_detail(&ctx, "Post deleted successfully!", &post.slug);
    Ok(())
}
