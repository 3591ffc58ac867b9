// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use crate::config::model::{CategoryConfig, ConfigFile, RawConfigFile};
use crate::errors::{PipelineError, Result};
use crate::paths::{PathSpec, PathTable, PatternSet, SourceSet};
use crate::types::AssetCategory;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_roots(&raw.paths.src, &raw.paths.dist)?;
        validate_server(&raw)?;

        let mut table = PathTable::defaults(&raw.paths.src, &raw.paths.dist);
        apply_overrides(&mut table, &raw)?;

        if !raw.features.svg_sprite {
            table.get_mut(AssetCategory::VectorSprite).enabled = false;
        }

        ensure_has_enabled(&table)?;
        for spec in table.enabled() {
            validate_spec(spec, table.dist_root())?;
        }

        Ok(ConfigFile::new_unchecked(table, raw.server, raw.features))
    }
}

fn validate_roots(src: &str, dist: &str) -> Result<()> {
    let src = normalize(src);
    let dist = normalize(dist);

    if src.as_os_str().is_empty() {
        return Err(PipelineError::ConfigError(
            "[paths].src must not be empty or the project root".to_string(),
        ));
    }
    if dist.as_os_str().is_empty() {
        return Err(PipelineError::ConfigError(
            "[paths].dist must not be empty or the project root (clean would delete the project)"
                .to_string(),
        ));
    }
    if dist.is_absolute() || has_parent_dir(&dist) {
        return Err(PipelineError::ConfigError(format!(
            "[paths].dist must be a directory inside the project (got {})",
            dist.display()
        )));
    }
    if src.starts_with(&dist) {
        return Err(PipelineError::ConfigError(format!(
            "[paths].dist ({}) contains the sources ({}); clean would delete them",
            dist.display(),
            src.display()
        )));
    }
    Ok(())
}

fn validate_server(raw: &RawConfigFile) -> Result<()> {
    if raw.server.port == 0 {
        return Err(PipelineError::ConfigError(
            "[server].port must be between 1 and 65535 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn apply_overrides(table: &mut PathTable, raw: &RawConfigFile) -> Result<()> {
    for (name, overrides) in raw.category.iter() {
        let category: AssetCategory = name
            .parse()
            .map_err(|e: String| PipelineError::ConfigError(format!("[category.{name}]: {e}")))?;
        apply_override(table.get_mut(category), overrides);
    }
    Ok(())
}

fn apply_override(spec: &mut PathSpec, overrides: &CategoryConfig) {
    if let Some(src) = &overrides.src {
        spec.sources = src.clone();
    }
    if let Some(exclude) = &overrides.exclude {
        spec.exclude = exclude.clone();
    }
    if let Some(base) = &overrides.base {
        spec.base = normalize(base);
    }
    if let Some(dest) = &overrides.dest {
        spec.dest = normalize(dest);
    }
    if let Some(watch) = &overrides.watch {
        spec.watch = watch.clone();
    }
    if let Some(enabled) = overrides.enabled {
        spec.enabled = enabled;
    }
    if let Some(use_hash) = overrides.use_hash {
        spec.use_hash = use_hash;
    }
}

fn ensure_has_enabled(table: &PathTable) -> Result<()> {
    if table.enabled().next().is_none() {
        return Err(PipelineError::ConfigError(
            "every category is disabled; nothing to build".to_string(),
        ));
    }
    Ok(())
}

fn validate_spec(spec: &PathSpec, dist_root: &Path) -> Result<()> {
    let category = spec.category;

    if spec.sources.is_empty() {
        return Err(PipelineError::ConfigError(format!(
            "[category.{category}].src must list at least one glob"
        )));
    }

    SourceSet::from_spec(spec)
        .map_err(|e| PipelineError::ConfigError(format!("[category.{category}]: {e:#}")))?;
    PatternSet::compile(&spec.watch, &[])
        .map_err(|e| PipelineError::ConfigError(format!("[category.{category}].watch: {e:#}")))?;

    if !spec.dest.starts_with(dist_root) {
        return Err(PipelineError::ConfigError(format!(
            "[category.{category}].dest ({}) must be inside [paths].dist ({})",
            spec.dest.display(),
            dist_root.display()
        )));
    }
    Ok(())
}

/// Strip `./` prefixes and trailing slashes: `"./dist/"` -> `dist`.
fn normalize(path: &str) -> PathBuf {
    Path::new(path.trim())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn has_parent_dir(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}
