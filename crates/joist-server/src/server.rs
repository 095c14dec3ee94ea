//! Development server implementation.
//!
//! Serves the build output over HTTP, injects the reload client into HTML
//! responses, and re-runs the matching pipeline task when a source changes.
//! There is no teardown: once watching, the server runs until the process is
//! killed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Request, State,
    },
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use joist_pipeline::Pipeline;

use crate::watcher::{FileWatcher, WatchEvent, WatchPaths};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    hub: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
    pipeline: Pipeline,
}

impl DevServer {
    /// Create a new development server over an already-built pipeline.
    pub fn new(config: DevServerConfig, pipeline: Pipeline) -> Self {
        Self { config, pipeline }
    }

    /// Start the development server and the watch bindings.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .expect("Invalid address");

        let site = self.pipeline.config();
        let output_dir = site.output_dir.clone();

        let state = Arc::new(ServerState {
            hub: ReloadHub::new(),
        });

        // Set up file watcher
        let watch = WatchPaths {
            source_dir: site.source_dir.clone(),
            assets_dir: site.assets_source_dir(),
            output_dir: output_dir.clone(),
        };
        let (watcher, mut rx) =
            FileWatcher::new(&watch).map_err(|e| ServerError::WatchError(e.to_string()))?;

        // Spawn file watch handler
        let pipeline = self.pipeline.clone();
        let hub = state.hub.clone();
        tokio::spawn(async move {
            // Reloads within this window collapse into one: a single task
            // re-run touches many output files at once.
            let window = Duration::from_millis(250);
            let mut last_reload: Option<Instant> = None;

            while let Some(event) = rx.recv().await {
                match event {
                    WatchEvent::Html(path) => {
                        tracing::info!("page changed: {}", path.display());
                        if let Err(e) = pipeline.copy_html().await {
                            tracing::warn!("html task failed: {e}");
                        }
                    }
                    WatchEvent::Assets(path) => {
                        tracing::info!("asset changed: {}", path.display());
                        if let Err(e) = pipeline.copy_assets().await {
                            tracing::warn!("assets task failed: {e}");
                        }
                    }
                    WatchEvent::Styles(path) => {
                        tracing::info!("stylesheet changed: {}", path.display());
                        if let Err(e) = pipeline.compile_styles().await {
                            tracing::warn!("css task failed: {e}");
                        }
                    }
                    WatchEvent::Output(_) => {
                        let now = Instant::now();
                        if last_reload.map_or(true, |t| now.duration_since(t) >= window) {
                            last_reload = Some(now);
                            hub.send(ReloadMessage::Reload);
                        }
                    }
                }
            }
            // Keep watcher alive
            drop(watcher);
        });

        // Build router
        let app = Router::new()
            .route("/__reload", get(ws_handler))
            .route("/__reload.js", get(reload_script_handler))
            .fallback_service(ServeDir::new(&output_dir))
            .layer(middleware::from_fn(inject_reload_script))
            .with_state(state);

        tracing::info!("serving {} at http://{}", output_dir.display(), addr);

        // Open browser if configured
        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        // Start server
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    // Send connected message
    let msg = serde_json::to_string(&ReloadMessage::Connected).unwrap();
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    // Forward reload messages to the client
    while let Ok(reload) = rx.recv().await {
        let json = serde_json::to_string(&reload).unwrap();
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}

/// Response middleware that injects the reload client into HTML pages.
async fn inject_reload_script(req: Request, next: Next) -> Response {
    let res = next.run(req).await;

    let is_html = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/html"))
        .unwrap_or(false);
    if !is_html {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let injected = inject_into_html(&String::from_utf8_lossy(&bytes));

    // Length changed; let hyper recompute it.
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(injected))
}

/// Insert the reload script tag before `</body>`, or append when the page
/// has no closing body tag.
fn inject_into_html(html: &str) -> String {
    let tag = r#"<script src="/__reload.js"></script>"#;

    match html.rfind("</body>") {
        Some(idx) => format!("{}{}\n{}", &html[..idx], tag, &html[idx..]),
        None => format!("{html}{tag}"),
    }
}
