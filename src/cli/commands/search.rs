//! Search command - resolve a path segment the way the public site does

use super::list::{print_json, print_plain, print_table};
use super::read_posts;
use crate::cli::args::{OutputFormat, SearchArgs};
use crate::config::Config;
use crate::error::QuireResult;
use crate::query::{self, Resolved};
use crate::store::{Post, PostStore};
use crate::ui::{self, UiContext};

/// Execute the search command
pub async fn execute(args: SearchArgs, config: &Config) -> QuireResult<()> {
    let store = PostStore::from_config(config);
    let posts = read_posts(config, &store).await?;
    let ctx = UiContext::detect();

    let (label, found): (String, Vec<Post>) = match query::resolve(&posts, &args.segment) {
        Resolved::Post(post) => (format!("Post '{}'", post.slug), vec![post]),
        Resolved::Tag { tag, posts } => (format!("Tag '{}'", tag), posts),
        Resolved::Search { query, posts } => (format!("Search '{}'", query), posts),
    };

    match args.format {
        OutputFormat::Json => print_json(&found)?,
        OutputFormat::Plain => print_plain(&found),
        OutputFormat::Table if found.is_empty() => {
            ui::step_info(&ctx, &format!("{}: no posts found", label));
        }
        OutputFormat::Table => {
            ui::remark(&ctx, &label);
            print_table(&found);
        }
    }

    Ok(())
}
