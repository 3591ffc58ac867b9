#![allow(dead_code)]

use assetpipe::config::{CategoryConfig, ConfigFile, RawConfigFile};
use assetpipe::errors::Result;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn src(mut self, src: &str) -> Self {
        self.config.paths.src = src.to_string();
        self
    }

    pub fn dist(mut self, dist: &str) -> Self {
        self.config.paths.dist = dist.to_string();
        self
    }

    /// Apply `f` to the `[category.<name>]` override section.
    pub fn category(mut self, name: &str, f: impl FnOnce(&mut CategoryConfig)) -> Self {
        f(self.config.category.entry(name.to_string()).or_default());
        self
    }

    pub fn disable(self, name: &str) -> Self {
        self.category(name, |c| c.enabled = Some(false))
    }

    pub fn use_hash(self, name: &str) -> Self {
        self.category(name, |c| c.use_hash = Some(true))
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn notify_on_connect(mut self, val: bool) -> Self {
        self.config.server.notify = val;
        self
    }

    pub fn error_notifications(mut self, val: bool) -> Self {
        self.config.features.error_notifications = val;
        self
    }

    pub fn svg_sprite(mut self, val: bool) -> Self {
        self.config.features.svg_sprite = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
