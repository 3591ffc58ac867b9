// src/engine/runner.rs

//! Pluggable category runner.
//!
//! The runtime talks to a `CategoryRunner` instead of a concrete pipeline,
//! so tests can record triggers without building anything.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::types::{AssetCategory, TriggerReason};

use super::Pipeline;

pub trait CategoryRunner: Send + Sync + 'static {
    /// Run `category` once. Runs for the same category may overlap.
    fn run_category(
        &self,
        category: AssetCategory,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl CategoryRunner for Pipeline {
    fn run_category(
        &self,
        category: AssetCategory,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            debug!(category = %category, ?reason, "category triggered");
            Pipeline::run_category(self, category).await;
        })
    }
}
