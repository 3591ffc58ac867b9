// src/server/http.rs

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::errors::{PipelineError, Result};

use super::client::{EVENTS_PATH, client_script, inject_client};
use super::hub::{LiveReloadHub, ReloadEvent};

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Directory served at `/`.
    pub dist: PathBuf,
    /// Show a "connected" popup when a page connects.
    pub notify_on_connect: bool,
}

#[derive(Clone)]
struct ServerState {
    root: Arc<PathBuf>,
    hub: LiveReloadHub,
    script: Arc<String>,
}

pub fn router(options: ServerOptions, hub: LiveReloadHub) -> Router {
    let state = ServerState {
        root: Arc::new(options.dist),
        hub,
        script: Arc::new(client_script(options.notify_on_connect)),
    };
    Router::new()
        .route(EVENTS_PATH, get(events))
        .fallback(serve_file)
        .with_state(state)
}

/// Bind the dev server on loopback.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| PipelineError::ServerError(format!("binding {addr}: {e}")))
}

/// Serve until the task is dropped or the listener fails.
pub async fn serve(listener: TcpListener, options: ServerOptions, hub: LiveReloadHub) -> Result<()> {
    let local = listener.local_addr()?;
    info!(url = %format!("http://{local}"), root = %options.dist.display(), "dev server listening");
    axum::serve(listener, router(options, hub))
        .await
        .map_err(|e| PipelineError::ServerError(e.to_string()))
}

async fn events(State(state): State<ServerState>) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    debug!(clients = state.hub.client_count() + 1, "live-reload client connected");
    let updates = BroadcastStream::new(state.hub.subscribe()).filter_map(|msg| msg.ok());
    let stream = tokio_stream::iter([ReloadEvent::Connected])
        .chain(updates)
        .map(|event| Ok(to_sse(&event)));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse(event: &ReloadEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    Event::default().event(event.event_name()).data(data)
}

async fn serve_file(State(state): State<ServerState>, uri: Uri) -> Response {
    let Some(mut path) = resolve(&state.root, uri.path()) else {
        return not_found();
    };
    if tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
        path.push("index.html");
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(_) => return not_found(),
    };
    let content_type = content_type(&path);
    let body = if content_type.starts_with("text/html") {
        inject_client(&String::from_utf8_lossy(&bytes), &state.script).into_bytes()
    } else {
        bytes
    };

    (
        [(header::CONTENT_TYPE, content_type), (header::CACHE_CONTROL, "no-cache")],
        body,
    )
        .into_response()
}

/// Map a URL path onto `root`, refusing anything that escapes it.
pub fn resolve(root: &Path, url_path: &str) -> Option<PathBuf> {
    let relative = Path::new(url_path.trim_start_matches('/'));
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if url_path.ends_with('/') || url_path.is_empty() {
        resolved.push("index.html");
    }
    Some(resolved)
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
