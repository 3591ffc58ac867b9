// src/watch/event_handler.rs

//! Turns a changed path into the categories that must re-run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::paths::path_utils::relative_str;
use crate::paths::patterns::collect_matching_files;
use crate::types::AssetCategory;
use crate::watch::cache::FileCache;
use crate::watch::hash::{HashStore, MemoryHashStore, compute_aggregate_hash};
use crate::watch::profile::CategoryWatchProfile;

/// Routes filesystem changes to category triggers.
///
/// Routing is synchronous and touches the filesystem only for `use_hash`
/// categories; the watcher calls it on a blocking thread.
pub struct ChangeRouter {
    root: PathBuf,
    dist_root: PathBuf,
    profiles: Vec<CategoryWatchProfile>,
    fs: Arc<dyn FileSystem>,
    hash_store: Mutex<Box<dyn HashStore>>,
    file_cache: Mutex<FileCache>,
}

impl ChangeRouter {
    /// `dist_root` is relative to `root`; changes under it never trigger.
    pub fn new(
        root: impl Into<PathBuf>,
        dist_root: impl Into<PathBuf>,
        profiles: Vec<CategoryWatchProfile>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            root: root.into(),
            dist_root: dist_root.into(),
            profiles,
            fs,
            hash_store: Mutex::new(Box::new(MemoryHashStore::new())),
            file_cache: Mutex::new(FileCache::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Categories to trigger for a change at `path` (absolute or root-relative).
    pub fn categories_for(&self, path: &Path) -> Vec<AssetCategory> {
        let rel = if path.is_absolute() {
            match relative_str(&self.root, path) {
                Some(rel) => rel,
                None => {
                    debug!(?path, root = ?self.root, "event outside the project root");
                    return Vec::new();
                }
            }
        } else {
            crate::paths::path_utils::to_slash(path)
        };

        if Path::new(&rel).starts_with(&self.dist_root) {
            return Vec::new();
        }

        let mut triggered = Vec::new();
        for profile in self.profiles.iter().filter(|p| p.matches(&rel)) {
            if self.content_changed(profile, path) {
                debug!(category = %profile.category(), path = %rel, "watch match -> triggering category");
                triggered.push(profile.category());
            }
        }
        triggered
    }

    /// With `use_hash`, true only when the aggregate hash of every watched
    /// file differs from the last trigger. Errors fall back to triggering.
    fn content_changed(&self, profile: &CategoryWatchProfile, path: &Path) -> bool {
        if !profile.use_hash() {
            return true;
        }
        let category = profile.category();
        let abs_path = self.root.join(path);

        let walk_from = self.root.join(profile.walk_from());
        let files = if self.fs.is_dir(&walk_from) {
            match collect_matching_files(self.fs.as_ref(), &self.root, &walk_from, profile.patterns()) {
                Ok(files) => files,
                Err(err) => {
                    warn!(category = %category, error = %err, "failed to collect watched files; triggering anyway");
                    return true;
                }
            }
        } else {
            Vec::new()
        };

        let Ok(mut cache) = self.file_cache.lock() else {
            warn!("file cache mutex poisoned; triggering anyway");
            return true;
        };
        cache.invalidate(&abs_path);
        let mut hashes = Vec::with_capacity(files.len());
        for file in &files {
            match cache.get_or_compute(self.fs.as_ref(), file) {
                Ok(hash) => hashes.push(hash),
                Err(err) => {
                    warn!(category = %category, file = ?file, error = %err, "failed to hash file; triggering anyway");
                    return true;
                }
            }
        }
        drop(cache);
        let new_hash = compute_aggregate_hash(&hashes);

        let Ok(mut store) = self.hash_store.lock() else {
            warn!("hash store mutex poisoned; triggering anyway");
            return true;
        };
        if store.load(category).as_deref() == Some(new_hash.as_str()) {
            info!(category = %category, path = ?path, "watched content unchanged; skipping trigger");
            return false;
        }
        store.save(category, &new_hash);
        true
    }
}
