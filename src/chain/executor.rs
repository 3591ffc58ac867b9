// src/chain/executor.rs

//! Runs a [`ProcessorChain`] over one category's sources.
//!
//! Execution is synchronous; callers run it on a blocking thread. A failure
//! is recorded against the file being processed and the run continues with
//! the next file, so one broken source never stops the category. Panics
//! raised by the underlying libraries are caught and treated the same way.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, trace};

use crate::fs::FileSystem;
use crate::paths::path_utils::{to_slash, with_suffix};
use crate::paths::{PathSpec, SourceSet, dest_is_fresh};
use crate::server::{ReloadEvent, ReloadSink};
use crate::transform::sourcemap::reference_comment;
use crate::transform::{Asset, SourceMap};

use super::report::{CategoryReport, FileOutcome, FileStatus, SkipReason};
use super::steps::{ChainStep, FreshnessTarget};
use super::{ChainMode, ProcessorChain};

enum BranchResult {
    Written(Vec<PathBuf>),
    UpToDate,
    NoOutput,
}

struct StepFailure {
    step: &'static str,
    message: String,
}

impl StepFailure {
    fn new(step: &'static str, err: anyhow::Error) -> Self {
        Self {
            step,
            message: format!("{err:#}"),
        }
    }
}

/// Run one library call, turning both errors and panics into a failure of
/// the current file.
fn guarded<T>(
    step: &'static str,
    f: impl FnOnce() -> Result<T>,
) -> std::result::Result<T, StepFailure> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.map_err(|e| StepFailure::new(step, e)),
        Err(payload) => Err(StepFailure {
            step,
            message: format!("{step} panicked: {}", panic_message(&*payload)),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

pub struct ChainExecutor<'a> {
    fs: &'a dyn FileSystem,
    root: &'a Path,
    dist_root: &'a Path,
    spec: &'a PathSpec,
    reload: &'a dyn ReloadSink,
}

impl<'a> ChainExecutor<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        root: &'a Path,
        dist_root: &'a Path,
        spec: &'a PathSpec,
        reload: &'a dyn ReloadSink,
    ) -> Self {
        Self {
            fs,
            root,
            dist_root,
            spec,
            reload,
        }
    }

    pub fn run(&self, chain: &ProcessorChain) -> CategoryReport {
        let category = chain.category;
        let sources = match SourceSet::from_spec(self.spec)
            .and_then(|set| set.collect(self.fs, self.root))
        {
            Ok(sources) => sources,
            Err(err) => return CategoryReport::fatal(category, format!("{err:#}")),
        };
        debug!(category = %category, files = sources.len(), "collected sources");

        let mut report = CategoryReport::new(category);
        match chain.mode {
            ChainMode::PerFile => {
                for source in &sources {
                    let outcome = match self.load(source) {
                        Ok(asset) => self.run_branches(chain, vec![asset], self.root_relative(source)),
                        Err(err) => self.failed(self.root_relative(source), StepFailure::new("src", err)),
                    };
                    report.outcomes.push(outcome);
                }
            }
            ChainMode::Combined if sources.is_empty() => {}
            ChainMode::Combined => {
                let loaded: Result<Vec<Asset>> = sources.iter().map(|s| self.load(s)).collect();
                let outcome = match loaded {
                    Ok(assets) => self.run_branches(chain, assets, self.spec.base.clone()),
                    Err(err) => self.failed(self.spec.base.clone(), StepFailure::new("src", err)),
                };
                report.outcomes.push(outcome);
            }
        }
        report
    }

    fn run_branches(&self, chain: &ProcessorChain, assets: Vec<Asset>, source: PathBuf) -> FileOutcome {
        let mut written = Vec::new();
        let mut up_to_date = false;
        let mut failure = None;

        for branch in &chain.branches {
            match self.run_branch(branch, assets.clone()) {
                Ok(BranchResult::Written(paths)) => written.extend(paths),
                Ok(BranchResult::UpToDate) => up_to_date = true,
                Ok(BranchResult::NoOutput) => {}
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        if let Some(failure) = failure {
            return self.failed(source, failure);
        }
        let status = if !written.is_empty() {
            FileStatus::Written(written)
        } else if up_to_date {
            FileStatus::Skipped(SkipReason::UpToDate)
        } else {
            FileStatus::Skipped(SkipReason::NoOutput)
        };
        trace!(file = %source.display(), ?status, "processed");
        FileOutcome { source, status }
    }

    fn run_branch(
        &self,
        steps: &[ChainStep],
        mut assets: Vec<Asset>,
    ) -> std::result::Result<BranchResult, StepFailure> {
        let mut written = Vec::new();

        for step in steps {
            match step {
                ChainStep::InitSourceMap => {
                    for asset in &mut assets {
                        asset.source_map = Some(SourceMap::for_source(
                            &to_slash(&asset.rel_path),
                            String::from_utf8_lossy(&asset.contents).into_owned(),
                        ));
                    }
                }
                ChainStep::SkipIfNewer(target) => {
                    if !assets.is_empty() && assets.iter().all(|a| self.is_fresh(a, target)) {
                        return Ok(BranchResult::UpToDate);
                    }
                }
                ChainStep::Transform(transform) => {
                    let mut next = Vec::with_capacity(assets.len());
                    for asset in assets {
                        let out = guarded(transform.name(), || transform.apply(asset))?;
                        next.extend(out);
                    }
                    assets = next;
                }
                ChainStep::Combine(combine) => {
                    let combined = guarded(combine.name(), || combine.combine(assets))?;
                    assets = vec![combined];
                }
                ChainStep::Rename { suffix, extname } => {
                    for asset in &mut assets {
                        asset.rel_path = with_suffix(&asset.rel_path, suffix, *extname);
                    }
                }
                ChainStep::Write { source_map } => {
                    for asset in &assets {
                        let paths = self
                            .write(asset, *source_map)
                            .map_err(|e| StepFailure::new(step.name(), e))?;
                        written.extend(paths);
                    }
                }
            }

            if assets.is_empty() {
                break;
            }
        }

        if written.is_empty() {
            Ok(BranchResult::NoOutput)
        } else {
            Ok(BranchResult::Written(written))
        }
    }

    fn is_fresh(&self, asset: &Asset, target: &FreshnessTarget) -> bool {
        let dest = self
            .root
            .join(&self.spec.dest)
            .join(target.resolve(&asset.rel_path));
        dest_is_fresh(self.fs, &asset.origin, &dest)
    }

    /// Write `asset` under `dest`, plus its map when requested and present.
    /// Returns root-relative paths of everything written.
    fn write(&self, asset: &Asset, with_map: bool) -> Result<Vec<PathBuf>> {
        let rel_out = self.spec.dest.join(&asset.rel_path);
        let mut written = vec![rel_out.clone()];

        let map = asset.source_map.as_ref().filter(|_| with_map);
        let mut contents = Cow::Borrowed(asset.contents.as_slice());
        if let Some(map) = map {
            let file_name = asset.file_name();
            let map_name = format!("{file_name}.map");
            let ext = asset.extension().unwrap_or_default();
            if let Some(trailer) = reference_comment(&ext, &map_name) {
                contents.to_mut().extend_from_slice(trailer.as_bytes());
            }
            let map_rel = rel_out.with_file_name(&map_name);
            self.fs.write(&self.root.join(&map_rel), &map.to_json(&file_name)?)?;
            written.push(map_rel);
        }
        self.fs.write(&self.root.join(&rel_out), &contents)?;

        let url_path = rel_out
            .strip_prefix(self.dist_root)
            .map(to_slash)
            .unwrap_or_else(|_| to_slash(&rel_out));
        self.reload.send(ReloadEvent::for_output(&url_path));
        debug!(category = %self.spec.category, file = %to_slash(&rel_out), "wrote output");

        Ok(written)
    }

    fn load(&self, source: &Path) -> Result<Asset> {
        let contents = self.fs.read(source)?;
        let base = self.root.join(&self.spec.base);
        let rel = match source.strip_prefix(&base) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from(source.file_name().unwrap_or_default()),
        };
        Ok(Asset::new(rel, source, contents))
    }

    fn root_relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root).unwrap_or(path).to_path_buf()
    }

    fn failed(&self, source: PathBuf, failure: StepFailure) -> FileOutcome {
        debug!(
            category = %self.spec.category,
            file = %source.display(),
            step = failure.step,
            error = %failure.message,
            "file failed"
        );
        FileOutcome {
            source,
            status: FileStatus::Failed {
                step: failure.step.to_string(),
                message: failure.message,
            },
        }
    }
}
