// src/server/hub.rs

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Message pushed to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadEvent {
    /// Reload the whole page.
    Reload { path: String },
    /// Re-fetch stylesheets matching `path` without a page reload.
    Inject { path: String },
    /// Show a build error popup.
    Error { title: String, message: String },
    Connected,
}

impl ReloadEvent {
    /// The signal for a freshly written output, by its URL path under `dist`.
    pub fn for_output(url_path: &str) -> Self {
        let path = url_path.to_string();
        if url_path.ends_with(".css") {
            ReloadEvent::Inject { path }
        } else {
            ReloadEvent::Reload { path }
        }
    }

    /// SSE `event:` name.
    pub fn event_name(&self) -> &'static str {
        match self {
            ReloadEvent::Reload { .. } => "reload",
            ReloadEvent::Inject { .. } => "inject",
            ReloadEvent::Error { .. } => "error",
            ReloadEvent::Connected => "connected",
        }
    }
}

/// Receiver of live-reload signals from processors and the notifier.
pub trait ReloadSink: Send + Sync {
    fn send(&self, event: ReloadEvent);
}

/// Sink for one-shot commands where no browser is listening.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReloadSink for NullSink {
    fn send(&self, _event: ReloadEvent) {}
}

/// Fan-out of reload events to every connected browser.
#[derive(Debug, Clone)]
pub struct LiveReloadHub {
    tx: broadcast::Sender<ReloadEvent>,
}

impl LiveReloadHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LiveReloadHub {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ReloadSink for LiveReloadHub {
    fn send(&self, event: ReloadEvent) {
        let name = event.event_name();
        // No connected browser is not an error.
        if self.tx.send(event).is_err() {
            trace!(event = name, "no live-reload clients connected");
        }
    }
}
