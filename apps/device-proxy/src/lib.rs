#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::needless_pass_by_value
    )
)]

//! Device Proxy - Transparent HTTP Forwarder
//!
//! Exposes a fixed device host under a local `/api` prefix so browser
//! clients can reach it with permissive CORS, and answers one local JSON
//! endpoint itself.
//!
//! ```text
//! Browser ──► /api/foo?x=1 ──► device-proxy ──► <upstream>/foo?x=1
//!         ◄── status + body ◄──              ◄──
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Environment configuration.
pub mod config;

/// Forwarding errors and their HTTP mapping.
pub mod error;

/// Upstream client and header rewriting.
pub mod forward;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Router and server.
pub mod server;

/// Tracing subscriber setup.
pub mod telemetry;

pub use config::{ConfigError, DeviceProxyConfig};
pub use error::ProxyError;
pub use forward::{UpstreamClient, UpstreamResponse, strip_request_headers, strip_response_headers};
pub use metrics::init_metrics;
pub use server::{ProxyServer, ProxyState, ServerError, create_router};
