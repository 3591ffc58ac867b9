// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the [`Pipeline`], which runs Clean and the category chains and composes
//!   them into a build,
//! - the runtime event loop that reacts to file-watch triggers and shutdown,
//! - the long-running watch session (initial build, watcher, dev server).

use crate::types::{AssetCategory, TriggerReason};

/// Events flowing into the runtime from the watcher and signal handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A category should re-run.
    CategoryTriggered {
        category: AssetCategory,
        reason: TriggerReason,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod pipeline;
pub mod runner;
pub mod runtime;
pub mod session;

pub use pipeline::{BuildReport, Pipeline};
pub use runner::CategoryRunner;
pub use runtime::Runtime;
pub use session::watch_and_serve;
