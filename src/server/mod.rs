// src/server/mod.rs

//! Development server: static files from the destination tree plus a
//! Server-Sent-Events live-reload channel.

pub mod client;
pub mod http;
pub mod hub;

pub use client::{EVENTS_PATH, client_script, inject_client};
pub use http::{ServerOptions, bind, router, serve};
pub use hub::{LiveReloadHub, NullSink, ReloadEvent, ReloadSink};
