// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling each category's watch globs into a profile.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - (Optionally) content hashing so a category only re-runs when its
//!   watched files actually changed.
//!
//! It does not run anything; it only turns filesystem changes into
//! category-level triggers.

pub mod cache;
pub mod event_handler;
pub mod hash;
pub mod profile;
pub mod watcher;

pub use event_handler::ChangeRouter;
pub use hash::{HashStore, MemoryHashStore, compute_aggregate_hash, compute_file_hash};
pub use profile::{CategoryWatchProfile, build_profiles};
pub use watcher::{WatcherHandle, is_relevant, spawn_watcher};
