// src/paths/freshness.rs

//! Modification-time freshness checks ("newer" semantics).

use std::path::Path;
use std::time::SystemTime;

use crate::fs::FileSystem;

/// Pure comparison: a destination is up to date only when it exists and is
/// strictly newer than its source.
pub fn is_up_to_date(source: Option<SystemTime>, destination: Option<SystemTime>) -> bool {
    match (source, destination) {
        (Some(src), Some(dest)) => dest > src,
        // No destination yet, or an unreadable source: always rebuild.
        _ => false,
    }
}

/// `true` when `dest` exists and is strictly newer than `source`.
pub fn dest_is_fresh(fs: &dyn FileSystem, source: &Path, dest: &Path) -> bool {
    is_up_to_date(fs.modified(source), fs.modified(dest))
}

/// `true` when `dest` exists and is strictly newer than every one of `sources`.
pub fn dest_is_fresh_for_all(fs: &dyn FileSystem, sources: &[&Path], dest: &Path) -> bool {
    let Some(dest_time) = fs.modified(dest) else {
        return false;
    };
    sources
        .iter()
        .all(|src| is_up_to_date(fs.modified(src), Some(dest_time)))
}
