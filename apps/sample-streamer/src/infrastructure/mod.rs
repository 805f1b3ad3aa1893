//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Configuration loaded from the environment.
pub mod config;

/// HTTP router and server.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;

/// WebSocket adapter for streaming sessions.
pub mod websocket;
