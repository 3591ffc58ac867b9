// src/transform/scripts.rs

use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use minify_js::{Session, TopLevelMode, minify};
use regex::bytes::Regex;

use super::{Asset, Transform};

/// A top-level `import` or `export` statement at the start of a line.
static MODULE_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:import(?:[ \t]+[\w{*"']|[{*"'])|export(?:[ \t]+[\w{*]|[{*]))"#)
        .expect("valid regex")
});

/// Minify and mangle a JavaScript file.
///
/// Files with top-level `import`/`export` are parsed as ES modules, everything
/// else as a classic script.
pub struct MinifyJs;

impl MinifyJs {
    pub fn top_level_mode(source: &[u8]) -> TopLevelMode {
        if MODULE_SYNTAX.is_match(source) {
            TopLevelMode::Module
        } else {
            TopLevelMode::Global
        }
    }
}

impl Transform for MinifyJs {
    fn name(&self) -> &'static str {
        "minify-js"
    }

    fn apply(&self, asset: Asset) -> Result<Vec<Asset>> {
        let session = Session::new();
        let mode = Self::top_level_mode(&asset.contents);
        let mut out = Vec::with_capacity(asset.contents.len());
        minify(&session, mode, &asset.contents, &mut out)
            .map_err(|e| anyhow!("{}: {e:?}", asset.rel_path.display()))?;
        Ok(vec![asset.with_contents(out)])
    }
}
