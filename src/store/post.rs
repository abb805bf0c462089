//! Post records and the index document

use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Format of the `date` field
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maximum title length after sanitizing
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum number of tags kept per post
pub const MAX_TAGS: usize = 10;

/// One blog entry, as stored in the index document
///
/// The body lives in a sibling `<slug>.html` file and is never inlined here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,

    pub slug: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(
        default,
        serialize_with = "serialize_optional_url",
        deserialize_with = "deserialize_optional_url"
    )]
    pub featured_image: Option<String>,

    #[serde(default)]
    pub date: String,
}

impl Post {
    /// Build a post from a draft with a fresh timestamp
    pub fn from_draft(slug: String, draft: &PostDraft) -> Self {
        Self {
            title: draft.title.clone(),
            slug,
            description: draft.description.clone(),
            tags: draft.tags.clone(),
            featured_image: draft.featured_image.clone(),
            date: now_stamp(),
        }
    }

    /// Overwrite the metadata fields from a draft and refresh the date
    pub fn apply(&mut self, slug: String, draft: &PostDraft) {
        self.title = draft.title.clone();
        self.slug = slug;
        self.description = draft.description.clone();
        self.tags = draft.tags.clone();
        self.featured_image = draft.featured_image.clone();
        self.date = now_stamp();
    }

    /// `YYYY-MM-DD` part of the date, if the date is set
    pub fn day(&self) -> Option<&str> {
        self.date.get(..10)
    }
}

/// Current local time in the index date format
pub fn now_stamp() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

// Older indexes store a missing image as "".
fn serialize_optional_url<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

fn deserialize_optional_url<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// The whole index document: `{ "posts": [...] }`
///
/// Unknown top-level fields are carried through rewrites untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default)]
    pub posts: Vec<Post>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IndexDocument {
    /// Create a document holding the given posts
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts,
            extra: serde_json::Map::new(),
        }
    }

    /// Position of the post with `slug`
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.posts.iter().position(|p| p.slug == slug)
    }

    /// Whether any post uses `slug`
    pub fn contains(&self, slug: &str) -> bool {
        self.position(slug).is_some()
    }

    /// Slugs in list order
    pub fn slugs(&self) -> Vec<&str> {
        self.posts.iter().map(|p| p.slug.as_str()).collect()
    }
}

/// Normalized input for creating or updating a post
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    /// Raw markup, stored without escaping
    pub content: String,
}

impl PostDraft {
    /// Normalize raw form-style input into a draft
    ///
    /// `tags` is a comma-separated list. An image value that is not an
    /// absolute URL is dropped.
    pub fn new(
        title: &str,
        description: &str,
        tags: &str,
        featured_image: &str,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: sanitize_title(title),
            description: description.trim().to_string(),
            tags: parse_tags(tags),
            featured_image: parse_image_url(featured_image),
            content: content.into(),
        }
    }
}

/// Keep word characters, whitespace and `-.,!?`; trim; cap at 200 chars
pub fn sanitize_title(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || "_-.,!?".contains(*c))
        .take(MAX_TITLE_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split a comma-separated tag list, clean each tag and keep at most ten
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .take(MAX_TAGS)
        .map(|tag| {
            tag.trim()
                .chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Accept only absolute URLs
pub fn parse_image_url(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    url::Url::parse(input).ok().map(|_| input.to_string())
}

/// Direction of an adjacent swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("invalid direction '{other}', expected up or down")),
        }
    }
}
