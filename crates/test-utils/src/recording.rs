use std::sync::{Arc, Mutex};

use assetpipe::alerts::{BuildAlert, ErrorNotifier};
use assetpipe::server::{ReloadEvent, ReloadSink};

/// Reload sink that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct RecordingReloadSink {
    events: Arc<Mutex<Vec<ReloadEvent>>>,
}

impl RecordingReloadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReloadEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ReloadSink for RecordingReloadSink {
    fn send(&self, event: ReloadEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Notifier that keeps every alert for later assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<BuildAlert>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<BuildAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl ErrorNotifier for RecordingNotifier {
    fn notify(&self, alert: &BuildAlert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}
