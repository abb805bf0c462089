//! List command - show posts in index order

use super::read_posts;
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::QuireResult;
use crate::query::{self, Page};
use crate::store::{Post, PostStore};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> QuireResult<()> {
    let store = PostStore::from_config(config);
    let mut posts = read_posts(config, &store).await?;

    if let Some(ref tag) = args.tag {
        posts = query::filter_by_tag(&posts, tag);
    }

    let page = match args.page {
        Some(page) => query::paginate(&posts, page, config.site.posts_per_page),
        None => Page {
            total_items: posts.len(),
            total_pages: 1,
            page: 1,
            items: posts,
        },
    };

    if page.items.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No posts found");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => {
            print_table(&page.items);
            if args.page.is_some() {
                println!("Page {} of {}", page.page, page.total_pages);
            }
        }
        OutputFormat::Json => print_json(&page.items)?,
        OutputFormat::Plain => print_plain(&page.items),
    }

    Ok(())
}

/// Tabular listing shared with `search`
pub(crate) fn print_table(posts: &[Post]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Posts");

    println!(
        "{:<32} {:<36} {:<12} {:<24}",
        style("SLUG").bold(),
        style("TITLE").bold(),
        style("DATE").bold(),
        style("TAGS").bold()
    );
    println!("{}", "-".repeat(104));

    for post in posts {
        println!(
            "{:<32} {:<36} {:<12} {:<24}",
            truncate(&post.slug, 32),
            truncate(&post.title, 36),
            post.day().unwrap_or("-"),
            style(post.tags.join(", ")).dim()
        );
    }

    println!();
    println!("{} post(s)", posts.len());
}

pub(crate) fn print_json(posts: &[Post]) -> QuireResult<()> {
    let json = serde_json::to_string_pretty(posts)?;
    println!("{}", json);
    Ok(())
}

pub(crate) fn print_plain(posts: &[Post]) {
    for post in posts {
        println!("{}", post.slug);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
