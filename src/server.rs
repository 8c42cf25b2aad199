//! HTTP transport for `calculator.CalculatorService`.
//!
//! Serves the Connect unary JSON protocol for `Calculate`, answers CORS
//! preflights on the RPC routes and serves the web front end from a local
//! directory. One listener speaks HTTP/1.1 and cleartext HTTP/2 with prior
//! knowledge; an HTTP/1.1 `Upgrade: h2c` offer is served over HTTP/1.1.

use crate::browser;
use crate::calculator::CalculatorService;
use crate::proto::{CalculateRequest, CalculateResponse, CALCULATE_PATH};
use crate::rpc::{RpcError, CONNECT_PROTOCOL_VERSION, PROTOCOL_VERSION};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Prefix under which the RPC routes are mounted a second time for the web front end.
pub const API_PREFIX: &str = "/api";

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub web_dir: PathBuf,
    pub open_browser: bool,
    pub browser_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "localhost:8080".to_string(),
            web_dir: PathBuf::from("web"),
            open_browser: true,
            browser_delay: Duration::from_millis(500),
        }
    }
}

impl ServerConfig {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to create web directory {path}: {source}")]
    WebDir { path: PathBuf, source: io::Error },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

/// Creates `dir` when missing and warns when it has no `index.html`.
pub fn prepare_web_dir(dir: &Path) -> Result<(), ServerError> {
    if !dir.exists() {
        warn!(
            "web directory '{}' does not exist, creating it",
            dir.display()
        );
        std::fs::create_dir_all(dir).map_err(|source| ServerError::WebDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let index = dir.join("index.html");
    if !index.exists() {
        warn!(
            "'{}' not found, the web front end will not be available",
            index.display()
        );
    }

    Ok(())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::AUTHORIZATION,
            HeaderName::from_static(CONNECT_PROTOCOL_VERSION),
        ])
}

/// The RPC routes alone, with CORS applied.
pub fn rpc_router(service: CalculatorService) -> Router {
    Router::new()
        .route(CALCULATE_PATH, post(calculate))
        .with_state(service)
        .layer(cors_layer())
}

/// Full application: RPC routes, their `/api` mirror and static files.
pub fn router(config: &ServerConfig) -> Router {
    let rpc = rpc_router(CalculatorService::new());

    Router::new()
        .merge(rpc.clone())
        .nest(API_PREFIX, rpc)
        .fallback_service(ServeDir::new(&config.web_dir))
        .layer(TraceLayer::new_for_http())
}

async fn calculate(
    State(service): State<CalculatorService>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            [(
                HeaderName::from_static("accept-post"),
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            )],
        )
            .into_response();
    }

    match handle_calculate(&service, &headers, &body) {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            warn!(code = %err.code, "calculate failed: {}", err.message);
            err.into_response()
        }
    }
}

fn handle_calculate(
    service: &CalculatorService,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<CalculateResponse, RpcError> {
    if let Some(version) = headers.get(CONNECT_PROTOCOL_VERSION) {
        if version != PROTOCOL_VERSION {
            return Err(RpcError::invalid_argument(format!(
                "connect-protocol-version must be \"{}\": got {:?}",
                PROTOCOL_VERSION, version
            )));
        }
    }

    let request: CalculateRequest = serde_json::from_slice(body)
        .map_err(|e| RpcError::invalid_argument(format!("unmarshal request: {}", e)))?;

    service.calculate(&request)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Prepares the web directory, binds, prints the banner and serves until interrupted.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    prepare_web_dir(&config.web_dir)?;

    let listener = TcpListener::bind(&config.addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.addr.clone(),
            source,
        })?;

    let url = config.url();
    println!("Calculator server started at {}", url);
    println!("Web front end available at {}", url);
    info!(addr = %config.addr, web_dir = %config.web_dir.display(), "calculator server listening");

    let cancel = CancellationToken::new();
    if config.open_browser {
        browser::spawn_open(url, config.browser_delay, cancel.child_token());
    }

    println!("Press Ctrl+C to stop the server...");

    let on_shutdown = cancel.clone();
    serve(listener, router(&config), async move {
        shutdown_signal().await;
        on_shutdown.cancel();
    })
    .await?;

    info!("calculator server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
