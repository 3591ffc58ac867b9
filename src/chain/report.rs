// src/chain/report.rs

use std::path::PathBuf;

use crate::types::AssetCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Every destination was strictly newer than the source.
    UpToDate,
    /// The chain dropped the file (partials, unconvertible inputs).
    NoOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Paths written, relative to the project root.
    Written(Vec<PathBuf>),
    Skipped(SkipReason),
    Failed { step: String, message: String },
}

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Source path relative to the project root.
    pub source: PathBuf,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }
}

/// Result of one category run.
///
/// Per-file failures never abort the run; `fatal` is only set when the
/// category could not run at all (e.g. its source tree is unreadable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: AssetCategory,
    pub outcomes: Vec<FileOutcome>,
    pub fatal: Option<String>,
}

impl CategoryReport {
    pub fn new(category: AssetCategory) -> Self {
        Self {
            category,
            outcomes: Vec::new(),
            fatal: None,
        }
    }

    pub fn fatal(category: AssetCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            outcomes: Vec::new(),
            fatal: Some(message.into()),
        }
    }

    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Written(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Every written path, relative to the project root.
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                FileStatus::Written(paths) => Some(paths.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Human-readable messages for every failure, fatal first.
    pub fn failure_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self.fatal.iter().cloned().collect();
        for outcome in &self.outcomes {
            if let FileStatus::Failed { step, message } = &outcome.status {
                messages.push(format!("{} ({step}): {message}", outcome.source.display()));
            }
        }
        messages
    }

    pub fn is_success(&self) -> bool {
        self.fatal.is_none() && self.failed() == 0
    }
}
