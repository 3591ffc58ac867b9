// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::types::TriggerReason;
use crate::watch::event_handler::ChangeRouter;

/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Only content-affecting events re-run categories.
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Watch `router.root()` recursively and send a
/// `RuntimeEvent::CategoryTriggered` per matching category for every change.
pub fn spawn_watcher(
    router: ChangeRouter,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root: PathBuf = router.root().to_path_buf();
    let router = Arc::new(router);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // No tracing subscriber guarantee on the notify thread.
                    eprintln!("assetpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetpipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_relevant(&event.kind) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in event.paths {
                let router = Arc::clone(&router);
                let categories =
                    match tokio::task::spawn_blocking(move || router.categories_for(&path)).await {
                        Ok(categories) => categories,
                        Err(err) => {
                            warn!(error = %err, "change routing panicked");
                            continue;
                        }
                    };

                for category in categories {
                    let event = RuntimeEvent::CategoryTriggered {
                        category,
                        reason: TriggerReason::FileWatch,
                    };
                    if runtime_tx.send(event).await.is_err() {
                        debug!("runtime channel closed; stopping watcher loop");
                        return;
                    }
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
