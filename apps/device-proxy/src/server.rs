//! HTTP Server
//!
//! # Endpoints
//!
//! - `GET|POST|PUT|PATCH|DELETE|OPTIONS|HEAD /api/{*path}` - Forwarded upstream
//! - `POST /internal` - Local JSON echo
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format
//!
//! Every route answers CORS requests from any origin.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, RawQuery, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{MethodFilter, get, on, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::forward::UpstreamClient;
use crate::metrics::{get_metrics_handle, record_forwarded, record_upstream_error};

/// Methods relayed under `/api`.
const API_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::HEAD)
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::OPTIONS);

// =============================================================================
// State
// =============================================================================

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct ProxyState {
    upstream: UpstreamClient,
    max_body_bytes: usize,
}

impl ProxyState {
    /// Create handler state around an upstream client.
    #[must_use]
    pub const fn new(upstream: UpstreamClient, max_body_bytes: usize) -> Self {
        Self {
            upstream,
            max_body_bytes,
        }
    }
}

/// Build the router for all proxy endpoints.
pub fn create_router(state: ProxyState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/api/{*path}", on(API_METHODS, proxy_handler))
        .route("/api/", on(API_METHODS, proxy_handler))
        .route("/internal", post(internal_handler))
        .route("/healthz", get(liveness_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Server
// =============================================================================

/// Proxy HTTP server.
pub struct ProxyServer {
    addr: SocketAddr,
    state: ProxyState,
    cancel: CancellationToken,
}

impl ProxyServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(addr: SocketAddr, state: ProxyState, cancel: CancellationToken) -> Self {
        Self {
            addr,
            state,
            cancel,
        }
    }

    /// Bind the configured address and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::BindFailed(self.addr, e.to_string()))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ServerFailed` if the HTTP server fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let local = listener.local_addr().unwrap_or(self.addr);
        tracing::info!(
            addr = %local,
            upstream = self.state.upstream.base_url(),
            "Device proxy listening"
        );

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Device proxy stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

/// Path below `/api`, still percent-encoded as the client sent it.
fn upstream_path(uri: &Uri) -> &str {
    let path = uri.path();
    path.strip_prefix("/api").unwrap_or(path)
}

async fn proxy_handler(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    relay(
        &state,
        method,
        upstream_path(&uri),
        query.as_deref(),
        &headers,
        body,
    )
    .await
}

async fn relay(
    state: &ProxyState,
    method: Method,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let method_name = method.to_string();

    match state
        .upstream
        .forward(method, path, query, headers, body)
        .await
    {
        Ok(upstream) => {
            let elapsed = started.elapsed();
            record_forwarded(&method_name, upstream.status.as_u16(), elapsed);
            tracing::debug!(
                method = %method_name,
                path,
                status = upstream.status.as_u16(),
                elapsed_ms = elapsed.as_millis(),
                "Forwarded request"
            );
            upstream.into_response()
        }
        Err(e) => {
            record_upstream_error(&method_name);
            tracing::warn!(method = %method_name, path, error = %e, "Upstream request failed");
            e.into_response()
        }
    }
}

async fn internal_handler(Json(payload): Json<Value>) -> Json<Value> {
    Json(json!({
        "received": payload,
        "message": "Internal API OK",
    }))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

// =============================================================================
// Errors
// =============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
