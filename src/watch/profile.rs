// src/watch/profile.rs

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::paths::{PathTable, PatternSet};
use crate::types::AssetCategory;

/// Compiled watch globs for one category.
#[derive(Debug, Clone)]
pub struct CategoryWatchProfile {
    category: AssetCategory,
    patterns: PatternSet,
    /// Deepest directory containing every watch glob; hashing walks from here.
    walk_from: PathBuf,
    use_hash: bool,
}

impl CategoryWatchProfile {
    pub fn category(&self) -> AssetCategory {
        self.category
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.patterns.matches(rel_path)
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn walk_from(&self) -> &Path {
        &self.walk_from
    }

    pub fn use_hash(&self) -> bool {
        self.use_hash
    }
}

/// One profile per enabled category.
pub fn build_profiles(table: &PathTable) -> Result<Vec<CategoryWatchProfile>> {
    table
        .enabled()
        .map(|spec| {
            let patterns = PatternSet::compile(&spec.watch, &[])
                .with_context(|| format!("compiling watch globs for category {}", spec.category))?;
            Ok(CategoryWatchProfile {
                category: spec.category,
                patterns,
                walk_from: common_literal_prefix(&spec.watch),
                use_hash: spec.use_hash,
            })
        })
        .collect()
}

/// `src/assets/scss/**/*.scss` -> `src/assets/scss`.
pub fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    let mut parts = pattern.split('/').peekable();
    while let Some(part) = parts.next() {
        // The last part is a file name, not a directory.
        if parts.peek().is_none() || part.contains(['*', '?', '[', '{']) {
            break;
        }
        prefix.push(part);
    }
    prefix
}

fn common_literal_prefix(patterns: &[String]) -> PathBuf {
    let mut prefixes = patterns.iter().map(|p| literal_prefix(p));
    let Some(first) = prefixes.next() else {
        return PathBuf::new();
    };
    prefixes.fold(first, |acc, next| {
        acc.components()
            .zip(next.components())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect()
    })
}
