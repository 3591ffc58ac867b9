use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetpipe::engine::CategoryRunner;
use assetpipe::types::{AssetCategory, TriggerReason};

#[derive(Default)]
struct RunnerState {
    runs: Vec<(AssetCategory, TriggerReason)>,
    active: HashMap<AssetCategory, usize>,
    max_active: HashMap<AssetCategory, usize>,
}

/// A fake category runner that:
/// - records which categories were "run" and why
/// - optionally sleeps, so tests can observe overlapping runs.
#[derive(Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<RunnerState>>,
    delay: Option<Duration>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn runs(&self) -> Vec<(AssetCategory, TriggerReason)> {
        self.state.lock().unwrap().runs.clone()
    }

    /// Highest number of simultaneous runs seen for `category`.
    pub fn max_concurrent(&self, category: AssetCategory) -> usize {
        self.state
            .lock()
            .unwrap()
            .max_active
            .get(&category)
            .copied()
            .unwrap_or(0)
    }
}

impl CategoryRunner for FakeRunner {
    fn run_category(
        &self,
        category: AssetCategory,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let state = Arc::clone(&self.state);
        let delay = self.delay;

        Box::pin(async move {
            {
                let mut guard = state.lock().unwrap();
                guard.runs.push((category, reason));
                let active = guard.active.entry(category).or_default();
                *active += 1;
                let now = *active;
                let max = guard.max_active.entry(category).or_default();
                *max = (*max).max(now);
            }

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut guard = state.lock().unwrap();
            if let Some(active) = guard.active.get_mut(&category) {
                *active -= 1;
            }
        })
    }
}
