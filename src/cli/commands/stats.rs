//! Stats command - dashboard counters

use super::read_posts;
use crate::config::Config;
use crate::error::QuireResult;
use crate::media::MediaLibrary;
use crate::query;
use crate::store::PostStore;
use crate::ui::{self, UiContext};

/// Execute the stats command
pub async fn execute(config: &Config) -> QuireResult<()> {
    let ctx = UiContext::detect();
    let store = PostStore::from_config(config);
    let posts = read_posts(config, &store).await?;
    let images = MediaLibrary::new(config.images_dir()).count().await?;

    let stats = query::dashboard_stats(&posts, images);

    let title = if config.site.title.is_empty() {
        "Dashboard".to_string()
    } else {
        config.site.title.clone()
    };
    ui::intro(&ctx, &title);
    ui::key_value(&ctx, "posts", &stats.total_posts.to_string());
    ui::key_value(&ctx, "tags", &stats.total_tags.to_string());
    ui::key_value(&ctx, "images", &stats.images_count.to_string());

    if !stats.recent_posts.is_empty() {
        println!();
        ui::remark(&ctx, "Recent posts");
        for post in &stats.recent_posts {
            println!("  {:<12} {}", post.day().unwrap_or("-"), post.title);
        }
    }

    Ok(())
}
