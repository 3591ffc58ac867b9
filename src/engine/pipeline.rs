// src/engine/pipeline.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, error, info};

use crate::alerts::{BuildAlert, ErrorNotifier, LogNotifier};
use crate::chain::{CategoryReport, ChainExecutor, chain_for};
use crate::config::ConfigFile;
use crate::dag::{BuildGraph, BuildNode};
use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;
use crate::server::{NullSink, ReloadSink};
use crate::types::AssetCategory;

/// Reports from every category run by a build, in stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub categories: Vec<CategoryReport>,
}

impl BuildReport {
    pub fn get(&self, category: AssetCategory) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }

    pub fn written(&self) -> usize {
        self.categories.iter().map(CategoryReport::written).sum()
    }

    pub fn failed(&self) -> usize {
        self.categories
            .iter()
            .map(|r| r.failed() + usize::from(r.fatal.is_some()))
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.categories.iter().all(CategoryReport::is_success)
    }
}

/// The pipeline composer.
///
/// Cheap to clone; every clone shares the configuration, filesystem, reload
/// sink and notifier.
#[derive(Clone)]
pub struct Pipeline {
    root: Arc<PathBuf>,
    config: Arc<ConfigFile>,
    fs: Arc<dyn FileSystem>,
    reload: Arc<dyn ReloadSink>,
    notifier: Arc<dyn ErrorNotifier>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// A pipeline that logs errors and sends no reload signals.
    pub fn new(root: impl Into<PathBuf>, config: ConfigFile, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: Arc::new(root.into()),
            config: Arc::new(config),
            fs,
            reload: Arc::new(NullSink),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_reload_sink(mut self, reload: Arc<dyn ReloadSink>) -> Self {
        self.reload = reload;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ErrorNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn fs(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.fs)
    }

    /// Absolute (root-joined) destination root.
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(self.config.table().dist_root())
    }

    /// Remove the whole destination tree. A missing tree is success.
    pub async fn clean(&self) -> Result<()> {
        let dist = self.dist_dir();
        let fs = Arc::clone(&self.fs);
        let target = dist.clone();

        info!(path = %dist.display(), "cleaning destination");
        let outcome = tokio::task::spawn_blocking(move || fs.remove_dir_all(&target)).await;
        match outcome {
            Ok(Ok(())) => {
                debug!(path = %dist.display(), "destination removed");
                Ok(())
            }
            Ok(Err(err)) => Err(PipelineError::CleanFailed {
                path: dist,
                message: format!("{err:#}"),
            }),
            Err(join) => Err(PipelineError::CleanFailed {
                path: dist,
                message: join.to_string(),
            }),
        }
    }

    /// Run one category's processor over all of its sources.
    ///
    /// Per-file failures are reported and forwarded to the notifier; they
    /// never make this call fail.
    pub async fn run_category(&self, category: AssetCategory) -> CategoryReport {
        let spec = self.config.table().get(category).clone();
        if !spec.enabled {
            debug!(category = %category, "category disabled; nothing to do");
            return CategoryReport::new(category);
        }

        info!(category = %category, "running category");
        let root = Arc::clone(&self.root);
        let config = Arc::clone(&self.config);
        let fs = Arc::clone(&self.fs);
        let reload = Arc::clone(&self.reload);

        let report = tokio::task::spawn_blocking(move || {
            let executor = ChainExecutor::new(
                fs.as_ref(),
                &root,
                config.table().dist_root(),
                &spec,
                reload.as_ref(),
            );
            executor.run(&chain_for(category))
        })
        .await
        .unwrap_or_else(|join| CategoryReport::fatal(category, format!("processor panicked: {join}")));

        self.publish(&report);
        report
    }

    /// Clean, then every enabled category concurrently.
    pub async fn build(&self) -> Result<BuildReport> {
        let graph = BuildGraph::full(&self.config.table().enabled_categories());
        self.run_graph(&graph).await
    }

    /// Run `graph` stage by stage; nodes within a stage run concurrently.
    ///
    /// A Clean failure aborts the build before any category starts.
    pub async fn run_graph(&self, graph: &BuildGraph) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        for stage in graph.stages()? {
            debug!(?stage, "starting build stage");
            let handles: Vec<_> = stage
                .into_iter()
                .map(|node| {
                    let pipeline = self.clone();
                    tokio::spawn(async move { pipeline.run_node(node).await })
                })
                .collect();

            for handle in handles {
                match handle.await {
                    Ok(Ok(Some(category_report))) => report.categories.push(category_report),
                    Ok(Ok(None)) => {}
                    Ok(Err(err)) => {
                        error!(error = %err, "build aborted");
                        return Err(err);
                    }
                    Err(join) => return Err(PipelineError::Other(anyhow!("build task failed: {join}"))),
                }
            }
        }

        info!(
            categories = report.categories.len(),
            written = report.written(),
            failed = report.failed(),
            "build finished"
        );
        Ok(report)
    }

    async fn run_node(&self, node: BuildNode) -> Result<Option<CategoryReport>> {
        match node {
            BuildNode::Clean => self.clean().await.map(|()| None),
            BuildNode::Category(category) => Ok(Some(self.run_category(category).await)),
        }
    }

    fn publish(&self, report: &CategoryReport) {
        info!(
            category = %report.category,
            written = report.written(),
            skipped = report.skipped(),
            failed = report.failed(),
            "category finished"
        );
        for message in report.failure_messages() {
            self.notifier.notify(&BuildAlert::new(report.category, &message));
        }
    }
}
