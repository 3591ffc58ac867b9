// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PipelineError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls and the stock
///   path table).
/// - Checks globs, the destination root and category overrides.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// A missing file at the default location means "use the stock layout". A
/// missing file the user named explicitly is an error.
pub fn load_or_stock(path: impl AsRef<Path>, explicit: bool) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path.exists() {
        return load_and_validate(path);
    }
    if explicit {
        return Err(PipelineError::ConfigError(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    info!(path = %path.display(), "no config file; using stock layout");
    ConfigFile::try_from(RawConfigFile::default())
}

/// Default config location: `Assetpipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetpipe.toml")
}
