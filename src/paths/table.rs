// src/paths/table.rs

//! The Path Table: per-category source globs, destination and watch globs.

use std::path::{Path, PathBuf};

use crate::types::AssetCategory;

/// Where a category reads from, where it writes to and what it watches.
///
/// All globs and directories are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub category: AssetCategory,
    /// Globs selecting the files this category builds.
    pub sources: Vec<String>,
    /// Globs removed from `sources` (e.g. sprite icons out of the raster set).
    pub exclude: Vec<String>,
    /// Output paths are the source path relative to this directory.
    pub base: PathBuf,
    pub dest: PathBuf,
    /// Globs whose changes re-run this category.
    pub watch: Vec<String>,
    pub enabled: bool,
    /// Only re-run on watch events when watched content actually changed.
    pub use_hash: bool,
}

/// Immutable mapping of every category to its [`PathSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTable {
    src_root: PathBuf,
    dist_root: PathBuf,
    /// Indexed by `AssetCategory as usize`, in `AssetCategory::ALL` order.
    specs: [PathSpec; 6],
}

impl PathTable {
    /// The stock layout: `src/` sources mirrored into `dist/`.
    pub fn defaults(src_root: &str, dist_root: &str) -> Self {
        let src = trim_root(src_root);
        let dist = trim_root(dist_root);

        let image_exts = "{jpg,jpeg,png,svg,gif,ico,webp}";
        let font_exts = "{eot,woff,woff2,ttf,svg}";

        let specs = [
            PathSpec {
                category: AssetCategory::Markup,
                sources: vec![format!("{src}/*.html")],
                exclude: Vec::new(),
                base: PathBuf::from(src),
                dest: PathBuf::from(dist),
                watch: vec![format!("{src}/**/*.html")],
                enabled: true,
                use_hash: false,
            },
            PathSpec {
                category: AssetCategory::Styles,
                sources: vec![format!("{src}/assets/scss/*.scss")],
                exclude: Vec::new(),
                base: PathBuf::from(format!("{src}/assets/scss")),
                dest: PathBuf::from(format!("{dist}/assets/css")),
                watch: vec![format!("{src}/assets/scss/**/*.scss")],
                enabled: true,
                use_hash: false,
            },
            PathSpec {
                category: AssetCategory::Scripts,
                sources: vec![format!("{src}/assets/js/*.js")],
                exclude: Vec::new(),
                base: PathBuf::from(format!("{src}/assets/js")),
                dest: PathBuf::from(format!("{dist}/assets/js")),
                watch: vec![format!("{src}/assets/js/**/*.js")],
                enabled: true,
                use_hash: false,
            },
            PathSpec {
                category: AssetCategory::RasterImages,
                sources: vec![format!("{src}/assets/images/**/*.{image_exts}")],
                exclude: vec![format!("{src}/assets/images/sprite/*.svg")],
                base: PathBuf::from(format!("{src}/assets/images")),
                dest: PathBuf::from(format!("{dist}/assets/images")),
                watch: vec![format!("{src}/assets/images/**/*.{image_exts}")],
                enabled: true,
                use_hash: false,
            },
            PathSpec {
                category: AssetCategory::VectorSprite,
                sources: vec![format!("{src}/assets/images/sprite/*.svg")],
                exclude: Vec::new(),
                base: PathBuf::from(format!("{src}/assets/images/sprite")),
                dest: PathBuf::from(format!("{dist}/assets/images")),
                watch: vec![format!("{src}/assets/images/sprite/*.svg")],
                enabled: true,
                use_hash: false,
            },
            PathSpec {
                category: AssetCategory::Fonts,
                sources: vec![format!("{src}/assets/fonts/**/*.{font_exts}")],
                exclude: Vec::new(),
                base: PathBuf::from(format!("{src}/assets/fonts")),
                dest: PathBuf::from(format!("{dist}/assets/fonts")),
                watch: vec![format!("{src}/assets/fonts/**/*.{font_exts}")],
                enabled: true,
                use_hash: false,
            },
        ];

        Self {
            src_root: PathBuf::from(src),
            dist_root: PathBuf::from(dist),
            specs,
        }
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    /// The tree Clean removes.
    pub fn dist_root(&self) -> &Path {
        &self.dist_root
    }

    pub fn get(&self, category: AssetCategory) -> &PathSpec {
        &self.specs[category as usize]
    }

    pub fn get_mut(&mut self, category: AssetCategory) -> &mut PathSpec {
        &mut self.specs[category as usize]
    }

    pub fn specs(&self) -> impl Iterator<Item = &PathSpec> {
        self.specs.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &PathSpec> {
        self.specs.iter().filter(|s| s.enabled)
    }

    pub fn enabled_categories(&self) -> Vec<AssetCategory> {
        self.enabled().map(|s| s.category).collect()
    }
}

/// `"./dist/"` -> `"dist"`, so globs match root-relative paths.
fn trim_root(root: &str) -> &str {
    root.trim().trim_start_matches("./").trim_end_matches('/')
}
