//! Quire - flat-file blog post store
//!
//! Posts live in an ordered JSON index next to one HTML file per post.
//! Readers go through a time-boxed snapshot of the index; every admin
//! mutation holds a writer lock and invalidates that snapshot.

pub mod audit;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod query;
pub mod store;
pub mod ui;

pub use error::{QuireError, QuireResult};
