//! Sample Streamer Binary
//!
//! Starts the WebSocket sample streamer.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sample-streamer
//! ```
//!
//! # Environment Variables
//!
//! - `STREAMER_HOST` / `STREAMER_PORT`: Bind address (default: 0.0.0.0:8000)
//! - `STREAMER_MODE`: random | sine | sweep (default: random)
//! - `STREAMER_FREQUENCY_HZ`, `STREAMER_SAMPLE_RATE_HZ`, `STREAMER_CHUNK_SIZE`
//! - `STREAMER_SWEEP_MIN_HZ`, `STREAMER_SWEEP_MAX_HZ`, `STREAMER_SWEEP_STEP_HZ`
//! - `STREAMER_RANDOM_MIN_LEN`, `STREAMER_RANDOM_MAX_LEN`
//! - `STREAMER_PACING`: realtime | fixed (default: realtime)
//! - `STREAMER_INTERVAL_MS`: Fixed pacing interval (default: 500)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`, `OTEL_SERVICE_NAME`: Span export target
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sample_streamer::infrastructure::telemetry;
use sample_streamer::{AppState, StreamState, StreamerConfig, StreamerServer, init_metrics};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = StreamerConfig::from_env().context("invalid streamer configuration")?;
    let _telemetry_guard = telemetry::init(&config.telemetry);

    tracing::info!(otel_enabled = config.telemetry.otel_enabled, "Starting sample streamer");

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
    }

    log_config(&config);

    let session_config = config.session_config();
    session_config
        .validate()
        .context("invalid sample generation settings")?;

    let shutdown_token = CancellationToken::new();
    let state = AppState::new(
        Arc::new(StreamState::new()),
        session_config,
        shutdown_token.clone(),
    );
    let server = StreamerServer::new(config.server.addr(), state, shutdown_token.clone());

    let mut server_handle = tokio::spawn(server.run());

    tokio::select! {
        result = &mut server_handle => {
            shutdown_token.cancel();
            result.context("server task panicked")??;
            return Ok(());
        }
        () = await_shutdown(shutdown_token.clone()) => {}
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_handle).await {
        Ok(result) => result.context("server task panicked")??,
        Err(_) => tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Server did not stop before the shutdown timeout"
        ),
    }

    tracing::info!("Sample streamer stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &StreamerConfig) {
    tracing::info!(
        addr = %config.server.addr(),
        mode = config.generation.mode.as_str(),
        "Configuration loaded"
    );
    tracing::debug!(
        frequency_hz = config.generation.frequency_hz,
        sample_rate_hz = config.generation.sample_rate_hz,
        chunk_size = config.generation.chunk_size,
        interval_ms = config.session_config().interval().as_millis(),
        "Generation settings"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
