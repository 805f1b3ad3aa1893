//! Upstream Forwarding
//!
//! Relays one request to the device and returns its answer. The relayed
//! body is always fully decoded, so encoding and framing headers from either
//! side are dropped and recomputed by the next hop.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use reqwest::Client;

use crate::error::ProxyError;

/// Inbound headers never sent upstream.
///
/// `accept-encoding` is left to the client, which only asks for encodings it
/// can decode.
const REQUEST_HEADERS_TO_STRIP: [HeaderName; 5] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::ACCEPT_ENCODING,
];

/// Upstream headers never relayed back.
const RESPONSE_HEADERS_TO_STRIP: [HeaderName; 3] = [
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
    header::CONTENT_LENGTH,
];

/// Copy `headers` without the names in `strip`, keeping repeated values.
fn without(headers: &HeaderMap, strip: &[HeaderName]) -> HeaderMap {
    let mut kept = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !strip.contains(name) {
            kept.append(name.clone(), value.clone());
        }
    }
    kept
}

/// Headers to send upstream for an inbound request.
#[must_use]
pub fn strip_request_headers(headers: &HeaderMap) -> HeaderMap {
    without(headers, &REQUEST_HEADERS_TO_STRIP)
}

/// Headers to relay back from an upstream response.
#[must_use]
pub fn strip_response_headers(headers: &HeaderMap) -> HeaderMap {
    without(headers, &RESPONSE_HEADERS_TO_STRIP)
}

/// Buffered upstream answer.
#[derive(Debug)]
pub struct UpstreamResponse {
    /// Upstream status, relayed verbatim.
    pub status: StatusCode,
    /// Upstream headers after stripping.
    pub headers: HeaderMap,
    /// Decoded body.
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client for `base_url` that follows redirects.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::ClientBuild` if the TLS backend cannot start.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are forwarded to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upstream URL for a proxied `path` and raw `query`.
    #[must_use]
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}/{path}?{query}", self.base_url),
            None => format!("{}/{path}", self.base_url),
        }
    }

    /// Forward one request and buffer the upstream answer.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError` if the upstream is unreachable, times out, or
    /// breaks off while sending the body.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, ProxyError> {
        let url = self.target_url(path, query);

        let mut request = self
            .client
            .request(method, &url)
            .headers(strip_request_headers(headers));
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = strip_response_headers(response.headers());
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use test_case::test_case;

    fn client(base: &str) -> UpstreamClient {
        UpstreamClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test_case("foo", Some("x=1"), "http://10.42.0.1/foo?x=1" ; "path and query")]
    #[test_case("foo/bar", None, "http://10.42.0.1/foo/bar" ; "nested path")]
    #[test_case("foo", Some(""), "http://10.42.0.1/foo" ; "empty query dropped")]
    #[test_case("", None, "http://10.42.0.1/" ; "root")]
    #[test_case("/lead", None, "http://10.42.0.1/lead" ; "leading slash collapsed")]
    fn target_url_joins_base_and_path(path: &str, query: Option<&str>, expected: &str) {
        assert_eq!(client("http://10.42.0.1/").target_url(path, query), expected);
    }

    #[test]
    fn request_strip_drops_host_and_framing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:4000"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("3"));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("zstd"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.append("x-trace", HeaderValue::from_static("a"));
        headers.append("x-trace", HeaderValue::from_static("b"));

        let kept = strip_request_headers(&headers);

        assert!(kept.get(header::HOST).is_none());
        assert!(kept.get(header::CONTENT_LENGTH).is_none());
        assert!(kept.get(header::ACCEPT_ENCODING).is_none());
        assert_eq!(kept[header::AUTHORIZATION], "Bearer t");
        assert_eq!(kept.get_all("x-trace").iter().count(), 2);
    }

    #[test]
    fn response_strip_drops_encoding_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("10"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));

        let kept = strip_response_headers(&headers);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[header::CONTENT_TYPE], "text/html");
    }
}
