// src/engine/session.rs

//! The long-running `watch` command: initial build, watcher, dev server.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::errors::{PipelineError, Result};
use crate::fs::RealFileSystem;
use crate::server::{self, LiveReloadHub, ServerOptions};
use crate::watch::{ChangeRouter, build_profiles, spawn_watcher};

use super::{Pipeline, Runtime, RuntimeEvent};

/// Run a full build, then keep watching and serving until Ctrl-C.
///
/// The initial build, the watcher and the server start together; a watch
/// trigger that arrives during the initial build runs alongside it. A failed
/// initial build is logged and watching continues.
pub async fn watch_and_serve(pipeline: Pipeline, hub: LiveReloadHub) -> Result<()> {
    let config = pipeline.config().clone();
    let listener = server::bind(config.server().port).await?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let root = pipeline.root().canonicalize()?;
    let profiles = build_profiles(config.table())?;
    let router = ChangeRouter::new(
        root,
        config.table().dist_root(),
        profiles,
        Arc::new(RealFileSystem),
    );
    let _watcher = spawn_watcher(router, rt_tx.clone())?;

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = ServerOptions {
        dist: pipeline.dist_dir(),
        notify_on_connect: config.server().notify,
    };
    let mut server_task = tokio::spawn(server::serve(listener, options, hub));

    {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            if let Err(err) = pipeline.build().await {
                error!(error = %err, "initial build failed; still watching");
            }
        });
    }

    let runtime = Runtime::new(Arc::new(pipeline), rt_rx);
    tokio::select! {
        () = runtime.run() => {
            server_task.abort();
            info!("watch session finished");
            Ok(())
        }
        res = &mut server_task => match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join) => Err(PipelineError::ServerError(join.to_string())),
        },
    }
}
