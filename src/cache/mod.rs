//! Read cache for the public side
//!
//! A single-slot snapshot of the post index, persisted next to the site and
//! aged by its file modification time.
//!
//! # Cache States
//!
//! | State | Description |
//! |-------|-------------|
//! | Absent | No snapshot; next read builds one |
//! | Fresh | Younger than the TTL; served as-is |
//! | Stale | TTL elapsed; rebuilt lazily on next read |
//!
//! Every successful store mutation invalidates the slot (any state → Absent).

pub mod snapshot;

pub use snapshot::{ReadCache, SnapshotState, DEFAULT_TTL};
