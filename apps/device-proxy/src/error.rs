//! Proxy Errors
//!
//! Failures while talking to the upstream device, mapped to gateway status
//! codes with a JSON body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Errors raised while forwarding a request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The HTTP client could not be built.
    #[error("failed to build upstream client: {0}")]
    ClientBuild(String),

    /// The upstream did not answer within the configured timeout.
    #[error("upstream timed out: {0}")]
    Timeout(String),

    /// The upstream could not be reached or broke the exchange.
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl ProxyError {
    /// Status code reported to the client.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else {
            Self::Upstream(error.to_string())
        }
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("error"),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failure_is_bad_gateway() {
        let response = ProxyError::Upstream("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        assert_eq!(
            ProxyError::Timeout("30s".to_string()).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
