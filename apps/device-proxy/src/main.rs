//! Device Proxy Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin device-proxy
//! ```
//!
//! # Environment Variables
//!
//! - `DEVICE_PROXY_HOST` / `DEVICE_PROXY_PORT`: Bind address (default: 0.0.0.0:4000)
//! - `DEVICE_PROXY_UPSTREAM`: Device base URL (default: <http://10.42.0.1>)
//! - `DEVICE_PROXY_TIMEOUT_SECS`: Upstream timeout (default: 30)
//! - `DEVICE_PROXY_MAX_BODY_BYTES`: Request body limit (default: 16 MiB)
//! - `RUST_LOG`: Log level (default: info)

use std::time::Duration;

use anyhow::Context;
use device_proxy::{
    DeviceProxyConfig, ProxyServer, ProxyState, UpstreamClient, init_metrics, telemetry,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    telemetry::init();

    tracing::info!("Starting device proxy");

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
    }

    let config = DeviceProxyConfig::from_env().context("invalid proxy configuration")?;
    tracing::info!(
        addr = %config.addr(),
        upstream = %config.upstream,
        timeout_secs = config.timeout.as_secs(),
        "Configuration loaded"
    );

    let upstream = UpstreamClient::new(config.upstream.clone(), config.timeout)?;
    let shutdown_token = CancellationToken::new();
    let server = ProxyServer::new(
        config.addr(),
        ProxyState::new(upstream, config.max_body_bytes),
        shutdown_token.clone(),
    );

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
}
