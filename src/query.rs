//! Read-only projections over the post list used by the public side

use crate::store::{is_valid_slug, Post};
use serde::Serialize;

/// Number of posts shown in the dashboard's "recent" panel
pub const RECENT_POSTS: usize = 5;

/// What a single path segment resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The segment is a post slug
    Post(Post),
    /// The segment is a known tag; posts carrying it
    Tag { tag: String, posts: Vec<Post> },
    /// Free-text search results
    Search { query: String, posts: Vec<Post> },
}

/// Unique tags, in first-seen order
pub fn all_tags(posts: &[Post]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in posts.iter().flat_map(|p| &p.tags) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Posts carrying exactly `tag`
pub fn filter_by_tag(posts: &[Post], tag: &str) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| p.tags.iter().any(|t| t == tag))
        .cloned()
        .collect()
}

/// Case-insensitive search over tags (exact), title and description (substring)
pub fn search(posts: &[Post], query: &str) -> Vec<Post> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    posts
        .iter()
        .filter(|p| {
            p.tags.iter().any(|t| t.to_lowercase() == needle)
                || p.title.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Whether `query` is acceptable as a search term
pub fn is_search_term(query: &str) -> bool {
    !query.is_empty()
        && query
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_')
}

/// Resolve a URL path segment: post slug first, then tag, then search
pub fn resolve(posts: &[Post], segment: &str) -> Resolved {
    if is_valid_slug(segment) {
        if let Some(post) = posts.iter().find(|p| p.slug == segment) {
            return Resolved::Post(post.clone());
        }
    }

    if all_tags(posts).iter().any(|t| t == segment) {
        return Resolved::Tag {
            tag: segment.to_string(),
            posts: filter_by_tag(posts, segment),
        };
    }

    let results = if is_search_term(segment) {
        search(posts, segment)
    } else {
        Vec::new()
    };
    Resolved::Search {
        query: segment.to_string(),
        posts: results,
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out page `page` (1-based, clamped to at least 1)
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = (start + per_page).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items: items.len(),
    }
}

/// Dashboard counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_posts: usize,
    pub total_tags: usize,
    pub images_count: usize,
    pub recent_posts: Vec<Post>,
}

/// Compute dashboard counters from the post list and the image count
pub fn dashboard_stats(posts: &[Post], images_count: usize) -> DashboardStats {
    DashboardStats {
        total_posts: posts.len(),
        total_tags: all_tags(posts).len(),
        images_count,
        recent_posts: posts.iter().take(RECENT_POSTS).cloned().collect(),
    }
}
