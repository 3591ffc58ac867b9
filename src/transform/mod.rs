// src/transform/mod.rs

//! File transformations wrapped behind two small traits.
//!
//! A [`Transform`] maps one asset to zero or more assets (minify, compile,
//! convert); a [`Combine`] folds a whole batch into one (the sprite sheet).
//! The actual work is delegated to third-party libraries:
//!
//! - [`markup`]: `minify-html`
//! - [`styles`]: `grass` + `lightningcss`
//! - [`scripts`]: `minify-js`
//! - [`images`]: `image` + `oxipng`
//! - [`svg`]: regex-based SVG cleanup and the symbol sprite
//! - [`fonts`]: sfnt/WOFF/WOFF2/EOT containers via `flate2` + `brotli`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod fonts;
pub mod images;
pub mod markup;
pub mod scripts;
pub mod sourcemap;
pub mod styles;
pub mod svg;

pub use sourcemap::SourceMap;

/// A file flowing through a processor chain.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Path relative to the category base; becomes the path under `dest`.
    pub rel_path: PathBuf,
    /// The source file this asset was read from.
    pub origin: PathBuf,
    pub contents: Vec<u8>,
    pub source_map: Option<SourceMap>,
}

impl Asset {
    pub fn new(rel_path: impl Into<PathBuf>, origin: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            rel_path: rel_path.into(),
            origin: origin.into(),
            contents,
            source_map: None,
        }
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .with_context(|| format!("{} is not valid UTF-8", self.rel_path.display()))
    }

    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = contents.into();
        self
    }

    pub fn with_rel_path(mut self, rel_path: impl Into<PathBuf>) -> Self {
        self.rel_path = rel_path.into();
        self
    }

    /// Lower-cased extension of the current relative path.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.rel_path)
    }

    pub fn file_name(&self) -> String {
        self.rel_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// One-to-many per-file transformation.
///
/// Returning an empty vector drops the file from the stream (e.g. partial
/// stylesheets, inputs a converter does not handle).
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, asset: Asset) -> Result<Vec<Asset>>;
}

/// Many-to-one transformation over every source file of a category.
pub trait Combine: Send + Sync {
    fn name(&self) -> &'static str;
    fn combine(&self, assets: Vec<Asset>) -> Result<Asset>;
}
