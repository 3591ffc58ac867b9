// src/watch/hash.rs

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use blake3::Hasher;
use tracing::info;

use crate::fs::FileSystem;
use crate::types::AssetCategory;

/// Hash of a single file's contents.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let contents = fs.read(path)?;
    Ok(blake3::hash(&contents).to_hex().to_string())
}

/// Aggregate hash from per-file hashes.
///
/// `hashes` must be ordered by the corresponding file path to stay stable.
pub fn compute_aggregate_hash(hashes: &[String]) -> String {
    let mut hasher = Hasher::new();
    for h in hashes {
        hasher.update(h.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Last aggregate hash seen per category.
pub trait HashStore: Send + Sync {
    fn load(&self, category: AssetCategory) -> Option<String>;
    fn save(&mut self, category: AssetCategory, hash: &str);
}

#[derive(Debug, Default)]
pub struct MemoryHashStore {
    map: HashMap<AssetCategory, String>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashStore for MemoryHashStore {
    fn load(&self, category: AssetCategory) -> Option<String> {
        self.map.get(&category).cloned()
    }

    fn save(&mut self, category: AssetCategory, hash: &str) {
        self.map.insert(category, hash.to_string());
        info!(category = %category, hash = %hash, "stored watch hash");
    }
}
