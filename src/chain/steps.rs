// src/chain/steps.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::paths::path_utils::with_extension;
use crate::transform::{Combine, Transform};

/// Which destination file a freshness check compares the source against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessTarget {
    /// The same relative path under `dest`.
    SamePath,
    /// The same relative path with its extension replaced.
    Extension(&'static str),
    /// One fixed file under `dest` (combined outputs).
    Fixed(PathBuf),
}

impl FreshnessTarget {
    /// Destination path, relative to the category `dest`, for a source `rel`.
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        match self {
            FreshnessTarget::SamePath => rel.to_path_buf(),
            FreshnessTarget::Extension(ext) => with_extension(rel, ext),
            FreshnessTarget::Fixed(path) => path.clone(),
        }
    }
}

#[derive(Clone)]
pub enum ChainStep {
    /// Start a source map naming the original file.
    InitSourceMap,
    /// Drop sources whose destination is strictly newer.
    SkipIfNewer(FreshnessTarget),
    Transform(Arc<dyn Transform>),
    Combine(Arc<dyn Combine>),
    /// `name.ext` -> `name{suffix}.{extname}`.
    Rename {
        suffix: &'static str,
        extname: Option<&'static str>,
    },
    /// Write every current asset under `dest` and signal a reload for each.
    Write { source_map: bool },
}

impl ChainStep {
    /// Label used in logs and failure reports.
    pub fn name(&self) -> &'static str {
        match self {
            ChainStep::InitSourceMap => "sourcemaps.init",
            ChainStep::SkipIfNewer(_) => "newer",
            ChainStep::Transform(t) => t.name(),
            ChainStep::Combine(c) => c.name(),
            ChainStep::Rename { .. } => "rename",
            ChainStep::Write { .. } => "dest",
        }
    }
}

impl fmt::Debug for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStep::SkipIfNewer(target) => f.debug_tuple("SkipIfNewer").field(target).finish(),
            ChainStep::Rename { suffix, extname } => f
                .debug_struct("Rename")
                .field("suffix", suffix)
                .field("extname", extname)
                .finish(),
            ChainStep::Write { source_map } => f
                .debug_struct("Write")
                .field("source_map", source_map)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}
