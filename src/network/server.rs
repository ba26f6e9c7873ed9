//! HTTP Game Server
//!
//! Async HTTP/1.1 server for the guessing game API.
//! Accepts connections, answers one request per connection, and routes
//! API calls onto the shared [`SharedSession`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ALLOW,
};
use http::{HeaderName, HeaderValue, Method, Request, Response, StatusCode};
use serde::Serialize;
use tokio::io::AsyncWrite;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Semaphore};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

use crate::game::session::SharedSession;
use crate::network::framing::{
    close_gracefully, empty_response, json_response, read_request, response_with, text_response,
    write_response,
};
use crate::network::protocol::{self, GuessRequest, GuessResponse, RestartResponse};

/// Header carrying the per-connection request id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const GUESS_PATH: &str = "/api/guess";
const RESTART_PATH: &str = "/api/restart";
const API_PREFIX: &str = "/api/";
const INDEX_FILE: &str = "index.html";

/// Longest wait for the client to finish sending after the response.
const CLOSE_LINGER: Duration = Duration::from_secs(2);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Time allowed to receive a full request.
    pub connection_timeout: Duration,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Directory of the built front end. `None` serves the API only.
    pub static_root: Option<PathBuf>,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1000,
            connection_timeout: Duration::from_secs(30),
            max_body_bytes: 64 * 1024,
            static_root: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// Unset or blank variables keep their defaults:
    /// - `GUESS_BIND_ADDR` (e.g. `127.0.0.1:3000`)
    /// - `GUESS_MAX_CONNECTIONS`
    /// - `GUESS_TIMEOUT_SECS`
    /// - `GUESS_STATIC_ROOT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("GUESS_BIND_ADDR") {
            config.bind_addr = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("GUESS_BIND_ADDR", v))?;
        }
        if let Some(v) = get("GUESS_MAX_CONNECTIONS") {
            config.max_connections = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("GUESS_MAX_CONNECTIONS", v))?;
        }
        if let Some(v) = get("GUESS_TIMEOUT_SECS") {
            let secs: u64 = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("GUESS_TIMEOUT_SECS", v))?;
            config.connection_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("GUESS_STATIC_ROOT") {
            config.static_root = Some(PathBuf::from(v));
        }

        Ok(config)
    }
}

/// Bad configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: String) -> Self {
        ConfigError::InvalidValue { var, value }
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// State shared by every connection task.
struct Shared {
    config: ServerConfig,
    session: SharedSession,
    connections: Arc<Semaphore>,
}

/// The game server.
pub struct GameServer {
    shared: Arc<Shared>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server around the process-wide session.
    pub fn new(config: ServerConfig, session: SharedSession) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let connections = Arc::new(Semaphore::new(config.max_connections));

        Self {
            shared: Arc::new(Shared {
                config,
                session,
                connections,
            }),
            shutdown_tx,
        }
    }

    /// Bind the configured address and serve until shutdown.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(&self.shared.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        info!(
            "Game server v{} listening on {}",
            self.shared.config.version,
            listener.local_addr()?
        );

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.handle_connection(stream, addr),
                        Err(e) => error!("Accept error: {}", e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new connection on its own task.
    fn handle_connection(&self, mut stream: TcpStream, addr: SocketAddr) {
        let shared = self.shared.clone();
        let request_id = Uuid::new_v4();
        let span = info_span!("conn", %addr, %request_id);

        tokio::spawn(
            async move {
                let config = &shared.config;
                let linger = config.connection_timeout.min(CLOSE_LINGER);

                let permit = match shared.connections.clone().try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!("Connection limit reached, rejecting {}", addr);
                        let mut response =
                            text_response(StatusCode::SERVICE_UNAVAILABLE, "server busy");
                        finalize(&mut response, request_id);
                        send(&mut stream, &response, false, config.connection_timeout).await;
                        close_gracefully(&mut stream, linger).await;
                        return;
                    }
                };

                let read = timeout(
                    config.connection_timeout,
                    read_request(&mut stream, config.max_body_bytes),
                )
                .await;

                let mut head_only = false;
                let mut response = match read {
                    Err(_) => {
                        debug!("Request timed out");
                        text_response(StatusCode::REQUEST_TIMEOUT, "request timeout")
                    }
                    Ok(Err(e)) => match e.status() {
                        Some(status) => {
                            debug!("Rejected request: {}", e);
                            text_response(status, e.to_string())
                        }
                        None => {
                            debug!("Client went away: {}", e);
                            return;
                        }
                    },
                    Ok(Ok(request)) => {
                        head_only = request.method() == Method::HEAD;
                        route(&request, &shared.session, config).await
                    }
                };

                finalize(&mut response, request_id);
                send(&mut stream, &response, head_only, config.connection_timeout).await;
                drop(permit);
                close_gracefully(&mut stream, linger).await;
            }
            .instrument(span),
        );
    }

    /// The session this server routes to.
    pub fn session(&self) -> &SharedSession {
        &self.shared.session
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub fn connection_count(&self) -> usize {
        self.shared.config.max_connections - self.shared.connections.available_permits()
    }
}

/// Write a response, giving up after `limit`. Returns whether it was sent.
async fn send<S>(
    stream: &mut S,
    response: &Response<Vec<u8>>,
    head_only: bool,
    limit: Duration,
) -> bool
where
    S: AsyncWrite + Unpin,
{
    match timeout(limit, write_response(stream, response, head_only)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            debug!("Failed to write response: {}", e);
            false
        }
        Err(_) => {
            debug!("Response write timed out after {:?}", limit);
            false
        }
    }
}

/// Add CORS and request id headers to an outgoing response.
fn finalize(response: &mut Response<Vec<u8>>, request_id: Uuid) {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, HEAD, POST, OPTIONS"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// Dispatch a request to its handler.
pub async fn route(
    request: &Request<Vec<u8>>,
    session: &SharedSession,
    config: &ServerConfig,
) -> Response<Vec<u8>> {
    let method = request.method();
    let path = request.uri().path();

    // CORS preflight for any path
    if method == Method::OPTIONS {
        return empty_response(StatusCode::NO_CONTENT);
    }

    match path {
        GUESS_PATH if method == Method::POST => handle_guess(request.body(), session).await,
        RESTART_PATH if method == Method::POST => handle_restart(session).await,
        GUESS_PATH | RESTART_PATH => method_not_allowed("POST"),
        p if p.starts_with(API_PREFIX) => text_response(StatusCode::NOT_FOUND, "not found"),
        p if method == Method::GET || method == Method::HEAD => {
            serve_static(p, config.static_root.as_deref()).await
        }
        _ => method_not_allowed("GET, HEAD"),
    }
}

/// `POST /api/guess`.
async fn handle_guess(body: &[u8], session: &SharedSession) -> Response<Vec<u8>> {
    let guess = match GuessRequest::from_json(body) {
        Ok(req) => req.guess,
        Err(e) => {
            debug!("Invalid guess body: {}", e);
            return text_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match session.submit_guess(guess).await {
        Ok(result) => {
            info!(
                outcome = %result.outcome,
                attempts_left = result.attempts_remaining,
                "Guess {} processed",
                guess
            );
            ok_json(&GuessResponse::from(result))
        }
        Err(e) => {
            debug!("Rejected guess {}: {}", guess, e);
            text_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// `POST /api/restart`.
async fn handle_restart(session: &SharedSession) -> Response<Vec<u8>> {
    let secret = session.restart().await;
    info!("Game restarted");
    ok_json(&RestartResponse::new(secret))
}

fn ok_json<T: Serialize>(body: &T) -> Response<Vec<u8>> {
    match protocol::to_json(body) {
        Ok(bytes) => json_response(StatusCode::OK, bytes),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

fn method_not_allowed(allow: &'static str) -> Response<Vec<u8>> {
    let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    response
}

// =============================================================================
// STATIC FILES
// =============================================================================

/// Serve a file from the front-end build directory.
///
/// Unknown paths without a file extension fall back to `index.html` so
/// client-side routes load the app; unknown files are 404.
async fn serve_static(path: &str, root: Option<&Path>) -> Response<Vec<u8>> {
    let Some(root) = root else {
        return text_response(StatusCode::NOT_FOUND, "not found");
    };
    let Some(relative) = sanitize_path(path) else {
        return text_response(StatusCode::NOT_FOUND, "not found");
    };

    let candidate = if relative.as_os_str().is_empty() {
        root.join(INDEX_FILE)
    } else {
        root.join(&relative)
    };

    if let Ok(bytes) = tokio::fs::read(&candidate).await {
        return response_with(StatusCode::OK, content_type_for(&candidate), bytes);
    }

    if relative.extension().is_some() {
        return text_response(StatusCode::NOT_FOUND, "not found");
    }

    let index = root.join(INDEX_FILE);
    match tokio::fs::read(&index).await {
        Ok(bytes) => response_with(StatusCode::OK, content_type_for(&index), bytes),
        Err(e) => {
            warn!("Missing {}: {}", index.display(), e);
            text_response(StatusCode::NOT_FOUND, "not found")
        }
    }
}

/// Turn a URL path into a relative file path, refusing traversal.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') || s.contains(':') => return None,
            s => out.push(s),
        }
    }
    Some(out)
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
