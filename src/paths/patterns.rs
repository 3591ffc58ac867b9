// src/paths/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;
use crate::paths::path_utils::relative_str;
use crate::paths::table::PathSpec;

/// Compiled include/exclude globs.
///
/// The patterns are relative to the project root; callers pass relative
/// paths with forward slashes (e.g. `"src/assets/js/app.js"`) into `matches`.
#[derive(Clone)]
pub struct PatternSet {
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSet")
            .field("include", &self.include.len())
            .field("exclude", &self.exclude.as_ref().map(GlobSet::len))
            .finish()
    }
}

impl PatternSet {
    pub fn compile(include: &[String], exclude: &[String]) -> Result<Self> {
        let include = build_globset(include).context("building include globset")?;
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };
        Ok(Self { include, exclude })
    }

    /// Returns true if `rel_path` is included and not excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Compiled source selection for one category.
#[derive(Debug, Clone)]
pub struct SourceSet {
    patterns: PatternSet,
    base: PathBuf,
}

impl SourceSet {
    pub fn from_spec(spec: &PathSpec) -> Result<Self> {
        let patterns = PatternSet::compile(&spec.sources, &spec.exclude)
            .with_context(|| format!("compiling sources for category {}", spec.category))?;
        Ok(Self {
            patterns,
            base: spec.base.clone(),
        })
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.patterns.matches(rel_path)
    }

    /// All files under `root` selected by this set, sorted.
    ///
    /// The walk starts at the category base directory; a missing base is an
    /// empty selection, not an error.
    pub fn collect(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        let walk_from = root.join(&self.base);
        if !fs.is_dir(&walk_from) {
            return Ok(Vec::new());
        }
        collect_matching_files(fs, root, &walk_from, &self.patterns)
    }
}

/// Build a GlobSet from simple string patterns.
///
/// `*` does not cross directory boundaries; only `**` does.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files below `walk_from` whose path relative to `root` matches `set`.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    walk_from: &Path,
    set: &PatternSet,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![walk_from.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Some(rel) = relative_str(root, &path) {
                    if set.matches(&rel) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
