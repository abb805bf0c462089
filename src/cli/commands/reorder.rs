//! Move and shuffle commands - change the display order

use crate::audit::AuditLog;
use crate::auth::Authorizer;
use crate::cli::args::{MoveArgs, ShuffleArgs};
use crate::config::Config;
use crate::error::QuireResult;
use crate::store::{Direction, PostStore};
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the move command
pub async fn move_post(args: MoveArgs, config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    gate.authorize().await?;
    let ctx = UiContext::detect();
    let direction = Direction::from(args.direction);

    let store = PostStore::from_config(config);
    if !store.reorder(&args.slug, direction).await? {
        let edge = match direction {
            Direction::Up => "first",
            Direction::Down => "last",
        };
        ui::step_warn(&ctx, &format!("'{}' is already {}", args.slug, edge));
        return Ok(());
    }

    AuditLog::new(config)
        .log(
            "post.moved",
            &json!({ "slug": args.slug, "direction": direction.to_string() }),
        )
        .await;

    ui::step_ok_detail(
        &ctx,
        &format!("Post moved {} successfully!", direction),
        &args.slug,
    );
    Ok(())
}

/// Execute the shuffle command
pub async fn shuffle(args: ShuffleArgs, config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    gate.authorize().await?;
    let ctx = UiContext::detect().with_auto_yes(args.yes);

    let confirmed = ui::confirm(&ctx, "Shuffle the order of all posts?", false).await?;
    if !confirmed {
        ui::step_warn_hint(&ctx, "Shuffle cancelled", "Use --yes to skip confirmation");
        return Ok(());
    }

    let store = PostStore::from_config(config);
    store.shuffle_all().await?;

    AuditLog::new(config)
        .log("posts.shuffled", &json!({}))
        .await;

    ui::step_ok(&ctx, "Posts reshuffled successfully!");
    Ok(())
}
