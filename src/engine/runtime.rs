// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{CategoryRunner, RuntimeEvent};

/// Dispatches category triggers to a [`CategoryRunner`].
///
/// Every trigger starts an independent run: there is no queue, debounce or
/// cancellation, so two quick edits may run the same category twice
/// concurrently.
pub struct Runtime<R: CategoryRunner> {
    runner: Arc<R>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
}

impl<R: CategoryRunner> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

impl<R: CategoryRunner> Runtime<R> {
    pub fn new(runner: Arc<R>, event_rx: mpsc::Receiver<RuntimeEvent>) -> Self {
        Self { runner, event_rx }
    }

    /// Main event loop; returns on shutdown or when every sender is gone.
    pub async fn run(mut self) {
        info!("runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");
            match event {
                RuntimeEvent::CategoryTriggered { category, reason } => {
                    let runner = Arc::clone(&self.runner);
                    tokio::spawn(async move {
                        runner.run_category(category, reason).await;
                    });
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping runtime");
                    return;
                }
            }
        }

        info!("runtime event channel closed; exiting");
    }
}
