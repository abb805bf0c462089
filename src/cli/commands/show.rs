//! Show command - print one post

use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::Config;
use crate::error::{QuireError, QuireResult};
use crate::store::PostStore;
use crate::ui::{self, UiContext};

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config) -> QuireResult<()> {
    let store = PostStore::from_config(config);
    let post = store
        .find_by_slug(&args.slug)
        .await?
        .ok_or_else(|| QuireError::PostNotFound(args.slug.clone()))?;

    let content = if args.content {
        Some(store.load_content(&post.slug).await)
    } else {
        None
    };

    match args.format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&post)?;
            if let (Some(content), Some(map)) = (content, value.as_object_mut()) {
                map.insert("content".to_string(), serde_json::Value::String(content));
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Plain => {
            println!("{}", post.title);
            if let Some(content) = content {
                println!("{}", content);
            }
        }
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::intro(&ctx, &post.title);
            ui::key_value(&ctx, "slug", &post.slug);
            ui::key_value(&ctx, "date", &post.date);
            ui::key_value(&ctx, "description", &post.description);
            ui::key_value(&ctx, "tags", &post.tags.join(", "));
            ui::key_value(
                &ctx,
                "image",
                post.featured_image.as_deref().unwrap_or("-"),
            );
            if let Some(content) = content {
                println!();
                println!("{}", content);
            }
        }
    }

    Ok(())
}
