//! Development server with live reload for joist sites.
//!
//! Serves the build output, watches the sources, re-runs the matching
//! pipeline task on change, and pushes reload messages to connected browsers
//! over WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent, WatchPaths};
pub use websocket::{ReloadHub, ReloadMessage};
