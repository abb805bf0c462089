//! Flat-file post store
//!
//! Posts live in a single JSON index document (`posts.json`) and one
//! `<slug>.html` content file each. The index is authoritative: a post exists
//! when its entry does.

pub mod content;
pub mod index;
pub mod lock;
pub mod manager;
pub mod post;
pub mod saga;
pub mod slug;

pub use content::{ContentDir, CONTENT_PLACEHOLDER};
pub use index::IndexFile;
pub use manager::PostStore;
pub use post::{Direction, IndexDocument, Post, PostDraft};
pub use slug::{is_valid_slug, slugify, unique_slug};
