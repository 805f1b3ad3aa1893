//! HTTP and WebSocket Server
//!
//! One axum router serves the stream, the status poll and the operational
//! endpoints on the same port.
//!
//! # Endpoints
//!
//! - `GET /` - Static description of the service
//! - `GET /ws` - WebSocket upgrade; pushes `{"data": [...]}` frames
//! - `GET /status` - `{"streaming": bool, "array_size": int}`
//! - `GET /health` - JSON health status
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::services::{SessionConfig, StatusQuery, StatusResponse};
use crate::domain::stream_state::{SharedStreamState, StreamSnapshot};
use crate::infrastructure::metrics::get_metrics_handle;
use crate::infrastructure::websocket::serve_session;

// =============================================================================
// Application State
// =============================================================================

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    stream_state: SharedStreamState,
    session_config: Arc<SessionConfig>,
    shutdown: CancellationToken,
    version: &'static str,
    started_at: Instant,
}

impl AppState {
    /// Create handler state. Sessions are children of `shutdown`.
    #[must_use]
    pub fn new(
        stream_state: SharedStreamState,
        session_config: SessionConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            stream_state,
            session_config: Arc::new(session_config),
            shutdown,
            version: env!("CARGO_PKG_VERSION"),
            started_at: Instant::now(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" once the server answers.
    pub status: &'static str,
    /// Streamer version.
    pub version: &'static str,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Generation policy new sessions use.
    pub mode: &'static str,
    /// Latest stream status.
    pub stream: StreamSnapshot,
    /// Sessions streaming right now.
    pub live_sessions: usize,
    /// Sessions started since boot.
    pub sessions_started: u64,
}

/// Build the router for all streamer endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/ws", get(ws_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// Server
// =============================================================================

/// Streamer HTTP server.
pub struct StreamerServer {
    addr: SocketAddr,
    state: AppState,
    cancel: CancellationToken,
}

impl StreamerServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(addr: SocketAddr, state: AppState, cancel: CancellationToken) -> Self {
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
        tracing::info!(addr = %local, "Streamer listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Streamer stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Sample streamer running.",
        "endpoints": {
            "GET /status": "Current streaming flag + last array size",
            "WS  /ws": "WebSocket that streams arrays of floats",
        }
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        serve_session(
            socket,
            &state.session_config,
            &state.stream_state,
            &state.shutdown,
        )
        .await;
    })
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusQuery::new(Arc::clone(&state.stream_state)).get())
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: state.version,
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        mode: state.session_config.policy.mode_name(),
        stream: state.stream_state.snapshot(),
        live_sessions: state.stream_state.live_sessions(),
        sessions_started: state.stream_state.sessions_started(),
    })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stream_state::StreamState;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> (AppState, SharedStreamState) {
        let stream_state = Arc::new(StreamState::new());
        let state = AppState::new(
            Arc::clone(&stream_state),
            SessionConfig::default(),
            CancellationToken::new(),
        );
        (state, stream_state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn status_is_idle_before_any_session() {
        let (state, _) = test_state();
        let (status, body) = get_json(create_router(state), "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"streaming": false, "array_size": 0}));
    }

    #[tokio::test]
    async fn status_reflects_shared_state() {
        let (state, stream_state) = test_state();
        stream_state.begin_session();
        stream_state.record_chunk(12);

        let (_, body) = get_json(create_router(state), "/status").await;
        assert_eq!(body, json!({"streaming": true, "array_size": 12}));
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let (state, _) = test_state();
        let (status, body) = get_json(create_router(state), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
        assert!(body["endpoints"]["GET /status"].is_string());
        assert!(body["endpoints"]["WS  /ws"].is_string());
    }

    #[tokio::test]
    async fn health_reports_mode_and_sessions() {
        let (state, stream_state) = test_state();
        stream_state.begin_session();
        stream_state.begin_session();
        stream_state.end_session();

        let (status, body) = get_json(create_router(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["mode"], "random");
        assert_eq!(body["sessions_started"], 2);
        assert_eq!(body["live_sessions"], 1);
        assert_eq!(body["stream"]["active"], true);
    }

    #[tokio::test]
    async fn liveness_returns_ok() {
        let (state, _) = test_state();
        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn ws_route_rejects_plain_get() {
        let (state, stream_state) = test_state();
        let response = create_router(state)
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(stream_state.sessions_started(), 0);
    }
}
