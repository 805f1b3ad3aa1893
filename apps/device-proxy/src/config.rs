//! Proxy Configuration
//!
//! Loaded from environment variables. Numeric values that fail to parse fall
//! back to their defaults; an upstream that is not an http(s) URL is rejected.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Default device address.
pub const DEFAULT_UPSTREAM: &str = "http://10.42.0.1";

/// Proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProxyConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Upstream base URL, without a trailing slash.
    pub upstream: String,
    /// Timeout for one upstream exchange, redirects included.
    pub timeout: Duration,
    /// Largest request body accepted for forwarding.
    pub max_body_bytes: usize,
}

impl Default for DeviceProxyConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4000,
            upstream: DEFAULT_UPSTREAM.to_string(),
            timeout: Duration::from_secs(30),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl DeviceProxyConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DEVICE_PROXY_UPSTREAM` is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DEVICE_PROXY_UPSTREAM` is not an http(s) URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let upstream = match lookup("DEVICE_PROXY_UPSTREAM") {
            Some(raw) => normalize_upstream(&raw)?,
            None => defaults.upstream,
        };

        Ok(Self {
            host: parse_or(&lookup, "DEVICE_PROXY_HOST", defaults.host),
            port: parse_or(&lookup, "DEVICE_PROXY_PORT", defaults.port),
            upstream,
            timeout: lookup("DEVICE_PROXY_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map_or(defaults.timeout, Duration::from_secs),
            max_body_bytes: parse_or(
                &lookup,
                "DEVICE_PROXY_MAX_BODY_BYTES",
                defaults.max_body_bytes,
            ),
        })
    }

    /// Socket address to bind.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable holds a value outside the accepted set.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

fn normalize_upstream(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());

    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidValue {
            key: "DEVICE_PROXY_UPSTREAM".to_string(),
            value: raw.to_string(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use test_case::test_case;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DeviceProxyConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DeviceProxyConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, DeviceProxyConfig::default());
        assert_eq!(config.addr().to_string(), "0.0.0.0:4000");
        assert_eq!(config.upstream, "http://10.42.0.1");
    }

    #[test_case("http://10.42.0.1/", "http://10.42.0.1" ; "trailing slash trimmed")]
    #[test_case("https://device.local//", "https://device.local" ; "https with slashes")]
    #[test_case(" http://127.0.0.1:9000 ", "http://127.0.0.1:9000" ; "whitespace trimmed")]
    fn upstream_is_normalized(raw: &str, expected: &str) {
        let config = config_from(&[("DEVICE_PROXY_UPSTREAM", raw)]).unwrap();
        assert_eq!(config.upstream, expected);
    }

    #[test_case("10.42.0.1" ; "missing scheme")]
    #[test_case("ftp://device" ; "wrong scheme")]
    #[test_case("http://" ; "missing host")]
    fn bad_upstream_is_rejected(raw: &str) {
        assert!(matches!(
            config_from(&[("DEVICE_PROXY_UPSTREAM", raw)]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn overrides_and_fallbacks() {
        let config = config_from(&[
            ("DEVICE_PROXY_HOST", "127.0.0.1"),
            ("DEVICE_PROXY_PORT", "not-a-port"),
            ("DEVICE_PROXY_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.addr().to_string(), "127.0.0.1:4000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_keeps_default() {
        let config = config_from(&[("DEVICE_PROXY_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
