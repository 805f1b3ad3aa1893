#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::cast_precision_loss
    )
)]

//! Sample Streamer - Paced Waveform Push Service
//!
//! Streams batches of numeric samples to WebSocket clients at a fixed pace
//! and exposes the latest stream status to unrelated pollers.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Sample generation and the shared stream status
//!   - `generator`: Random, sine and sweeping-sine chunk generators
//!   - `stream_state`: Process-wide live session count and last chunk size
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Outbound chunk sink
//!   - `services`: Streaming session state machine, status query
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `config`: Environment configuration
//!   - `http`: Router and server for stream, status and health endpoints
//!   - `websocket`: Socket sink and disconnect watcher
//!   - `metrics`, `telemetry`: Prometheus and tracing
//!
//! # Data Flow
//!
//! ```text
//!                ┌──────────────┐  chunk   ┌───────────┐  {"data":[..]}
//! Generator ───► │ StreamSession│ ───────► │ WebSocket │ ──────────────► Client
//!                └──────┬───────┘          └───────────┘
//!                       │ begin/end_session, record_chunk
//!                       ▼
//!                ┌──────────────┐  snapshot  ┌─────────┐
//!                │ StreamState  │ ─────────► │ /status │ ──────────────► Poller
//!                └──────────────┘            └─────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Generation and status types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::generator::{
    Chunk, GenerationPolicy, GeneratorError, GeneratorState, SampleGenerator,
};
pub use domain::stream_state::{SharedStreamState, StreamSnapshot, StreamState};

// Application services
pub use application::ports::{ChunkMessage, ChunkSink, SinkError};
pub use application::services::{
    CloseReason, Pacing, SessionConfig, SessionConfigError, SessionOutcome, SessionPhase,
    StatusQuery, StatusResponse, StreamSession,
};

// Infrastructure config
pub use infrastructure::config::{ConfigError, StreamerConfig, TelemetrySettings};

// Server
pub use infrastructure::http::{AppState, ServerError, StreamerServer, create_router};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryGuard, init as init_telemetry};
