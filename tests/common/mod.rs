#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetpipe::config::ConfigFile;
use assetpipe::engine::Pipeline;
use assetpipe::fs::RealFileSystem;
use tempfile::TempDir;

pub use assetpipe_test_utils::fixtures::{
    multi_table_ttf, set_mtime, tiny_png, tiny_ttf, write_file,
};
pub use assetpipe_test_utils::{
    ConfigBuilder, RecordingNotifier, RecordingReloadSink, init_tracing, with_timeout,
};

/// A throwaway project directory using the stock `src/` -> `dist/` layout.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        write_file(self.root(), rel, contents)
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root().join(rel))
            .unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }

    pub fn pipeline(&self, config: ConfigFile) -> Pipeline {
        Pipeline::new(self.root(), config, Arc::new(RealFileSystem))
    }
}
