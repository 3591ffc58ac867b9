// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::paths::PathTable;

/// Top-level configuration as read from `Assetpipe.toml`.
///
/// ```toml
/// [paths]
/// src = "src/"
/// dist = "dist/"
///
/// [category.css]
/// src = ["src/assets/scss/*.scss"]
/// watch = ["src/assets/scss/**/*.scss"]
///
/// [server]
/// port = 3000
///
/// [features]
/// error_notifications = true
/// svg_sprite = true
/// ```
///
/// All sections are optional; an empty file reproduces the stock layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    /// Per-category overrides keyed by category name (`html`, `css`, ...).
    #[serde(default)]
    pub category: BTreeMap<String, CategoryConfig>,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub features: FeaturesSection,
}

/// `[paths]` section: the two roots every default pattern is derived from.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_src")]
    pub src: String,

    /// Destination root; this whole tree is removed by `clean`.
    #[serde(default = "default_dist")]
    pub dist: String,
}

fn default_src() -> String {
    "src/".to_string()
}

fn default_dist() -> String {
    "dist/".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            dist: default_dist(),
        }
    }
}

/// `[category.<name>]` section. Every field falls back to the stock layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub src: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub watch: Option<Vec<String>>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub use_hash: Option<bool>,
}

/// `[server]` section for the live-reload dev server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Show a short "connected" popup in the browser when the reload channel opens.
    #[serde(default)]
    pub notify: bool,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            notify: false,
        }
    }
}

/// `[features]` section: the two optional capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FeaturesSection {
    /// Forward per-file build errors to connected browsers as popups.
    #[serde(default = "default_true")]
    pub error_notifications: bool,

    /// Build the combined SVG symbol sprite.
    #[serde(default = "default_true")]
    pub svg_sprite: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeaturesSection {
    fn default() -> Self {
        Self {
            error_notifications: true,
            svg_sprite: true,
        }
    }
}

/// Validated, immutable configuration.
///
/// Construct with `ConfigFile::try_from(raw)`; see `config::validate`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    table: PathTable,
    server: ServerSection,
    features: FeaturesSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        table: PathTable,
        server: ServerSection,
        features: FeaturesSection,
    ) -> Self {
        Self {
            table,
            server,
            features,
        }
    }

    /// Configuration equivalent to an empty `Assetpipe.toml`.
    pub fn stock() -> Self {
        Self::new_unchecked(
            PathTable::defaults(&default_src(), &default_dist()),
            ServerSection::default(),
            FeaturesSection::default(),
        )
    }

    pub fn table(&self) -> &PathTable {
        &self.table
    }

    pub fn server(&self) -> ServerSection {
        self.server
    }

    pub fn features(&self) -> FeaturesSection {
        self.features
    }
}
