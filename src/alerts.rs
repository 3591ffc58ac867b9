// src/alerts.rs

//! Build-error notifications.
//!
//! Every failure is logged. With `features.error_notifications` on, it is also
//! pushed to connected browsers as an `error` live-reload event.

use std::sync::Arc;

use tracing::warn;

use crate::config::FeaturesSection;
use crate::server::{ReloadEvent, ReloadSink};
use crate::types::AssetCategory;

/// A failure worth telling the developer about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildAlert {
    pub category: AssetCategory,
    /// Per-category title, e.g. `"CSS Error"`.
    pub title: String,
    /// `"Error: <detail>"`.
    pub message: String,
}

impl BuildAlert {
    pub fn new(category: AssetCategory, detail: &str) -> Self {
        Self {
            category,
            title: category.error_title().to_string(),
            message: format!("Error: {detail}"),
        }
    }
}

pub trait ErrorNotifier: Send + Sync {
    fn notify(&self, alert: &BuildAlert);
}

/// Log-only notifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ErrorNotifier for LogNotifier {
    fn notify(&self, alert: &BuildAlert) {
        warn!(category = %alert.category, title = %alert.title, "{}", alert.message);
    }
}

/// Logs and shows a popup in every connected browser.
pub struct BrowserNotifier {
    sink: Arc<dyn ReloadSink>,
}

impl BrowserNotifier {
    pub fn new(sink: Arc<dyn ReloadSink>) -> Self {
        Self { sink }
    }
}

impl ErrorNotifier for BrowserNotifier {
    fn notify(&self, alert: &BuildAlert) {
        LogNotifier.notify(alert);
        self.sink.send(ReloadEvent::Error {
            title: alert.title.clone(),
            message: alert.message.clone(),
        });
    }
}

pub fn notifier_for(features: FeaturesSection, sink: Arc<dyn ReloadSink>) -> Arc<dyn ErrorNotifier> {
    if features.error_notifications {
        Arc::new(BrowserNotifier::new(sink))
    } else {
        Arc::new(LogNotifier)
    }
}
