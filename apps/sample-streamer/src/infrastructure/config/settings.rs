//! Streamer Configuration Settings
//!
//! Configuration types for the sample streamer, loaded from environment
//! variables. Numeric values that fail to parse fall back to their defaults;
//! unknown mode names are rejected.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::{DEFAULT_FIXED_INTERVAL, Pacing, SessionConfig};
use crate::domain::generator::GenerationPolicy;

/// Which generation policy new sessions use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Random-length arrays of uniform samples.
    #[default]
    Random,
    /// Constant-frequency sine wave.
    Sine,
    /// Ping-pong frequency sweep.
    Sweep,
}

impl GenerationMode {
    /// Get the mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sine => "sine",
            Self::Sweep => "sweep",
        }
    }
}

impl FromStr for GenerationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sine" => Ok(Self::Sine),
            "sweep" => Ok(Self::Sweep),
            _ => Err(ConfigError::InvalidValue {
                key: "STREAMER_MODE".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Pacing mode between pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacingMode {
    /// One chunk's worth of time at the sample rate.
    #[default]
    Realtime,
    /// Fixed interval.
    Fixed,
}

impl FromStr for PacingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "realtime" => Ok(Self::Realtime),
            "fixed" => Ok(Self::Fixed),
            _ => Err(ConfigError::InvalidValue {
                key: "STREAMER_PACING".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Bind address.
    pub host: IpAddr,
    /// HTTP/WebSocket port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
        }
    }
}

impl ServerSettings {
    /// Socket address to bind.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Waveform and random-array parameters.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Selected policy.
    pub mode: GenerationMode,
    /// Sine frequency, and sweep start frequency.
    pub frequency_hz: f64,
    /// Samples per second for the sine policies.
    pub sample_rate_hz: u32,
    /// Samples per chunk for the sine policies.
    pub chunk_size: usize,
    /// Sweep lower bound.
    pub sweep_min_hz: f64,
    /// Sweep upper bound.
    pub sweep_max_hz: f64,
    /// Sweep step per chunk.
    pub sweep_step_hz: f64,
    /// Shortest random chunk.
    pub random_min_len: usize,
    /// Longest random chunk.
    pub random_max_len: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Random,
            frequency_hz: 1.0,
            sample_rate_hz: 40,
            chunk_size: 8,
            sweep_min_hz: 1.0,
            sweep_max_hz: 10.0,
            sweep_step_hz: 0.1,
            random_min_len: 5,
            random_max_len: 15,
        }
    }
}

impl GenerationSettings {
    /// Build the generation policy for the selected mode.
    #[must_use]
    pub const fn policy(&self) -> GenerationPolicy {
        match self.mode {
            GenerationMode::Random => GenerationPolicy::Random {
                min_len: self.random_min_len,
                max_len: self.random_max_len,
            },
            GenerationMode::Sine => GenerationPolicy::FixedSine {
                frequency_hz: self.frequency_hz,
                sample_rate_hz: self.sample_rate_hz,
                chunk_size: self.chunk_size,
            },
            GenerationMode::Sweep => GenerationPolicy::SweepingSine {
                start_hz: self.frequency_hz,
                step_hz: self.sweep_step_hz,
                min_hz: self.sweep_min_hz,
                max_hz: self.sweep_max_hz,
                sample_rate_hz: self.sample_rate_hz,
                chunk_size: self.chunk_size,
            },
        }
    }
}

/// Pacing settings.
#[derive(Debug, Clone)]
pub struct PacingSettings {
    /// Realtime or fixed.
    pub mode: PacingMode,
    /// Interval for fixed pacing.
    pub interval: Duration,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            mode: PacingMode::Realtime,
            interval: DEFAULT_FIXED_INTERVAL,
        }
    }
}

/// Span export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySettings {
    /// Export spans over OTLP.
    pub otel_enabled: bool,
    /// OTLP gRPC endpoint.
    pub otlp_endpoint: String,
    /// Service name attached to exported spans.
    pub service_name: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            otel_enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: "sample-streamer".to_string(),
        }
    }
}

/// Complete streamer configuration.
#[derive(Debug, Clone, Default)]
pub struct StreamerConfig {
    /// Listener settings.
    pub server: ServerSettings,
    /// Generation settings.
    pub generation: GenerationSettings,
    /// Pacing settings.
    pub pacing: PacingSettings,
    /// Span export settings.
    pub telemetry: TelemetrySettings,
}

impl StreamerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a mode variable holds an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a mode variable holds an unknown value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_defaults = ServerSettings::default();
        let server = ServerSettings {
            host: parse_or(&lookup, "STREAMER_HOST", server_defaults.host),
            port: parse_or(&lookup, "STREAMER_PORT", server_defaults.port),
        };

        let defaults = GenerationSettings::default();
        let mode = lookup("STREAMER_MODE")
            .map(|s| s.parse::<GenerationMode>())
            .transpose()?
            .unwrap_or_default();

        let generation = GenerationSettings {
            mode,
            frequency_hz: parse_or(&lookup, "STREAMER_FREQUENCY_HZ", defaults.frequency_hz),
            sample_rate_hz: parse_or(&lookup, "STREAMER_SAMPLE_RATE_HZ", defaults.sample_rate_hz),
            chunk_size: parse_or(&lookup, "STREAMER_CHUNK_SIZE", defaults.chunk_size),
            sweep_min_hz: parse_or(&lookup, "STREAMER_SWEEP_MIN_HZ", defaults.sweep_min_hz),
            sweep_max_hz: parse_or(&lookup, "STREAMER_SWEEP_MAX_HZ", defaults.sweep_max_hz),
            sweep_step_hz: parse_or(&lookup, "STREAMER_SWEEP_STEP_HZ", defaults.sweep_step_hz),
            random_min_len: parse_or(&lookup, "STREAMER_RANDOM_MIN_LEN", defaults.random_min_len),
            random_max_len: parse_or(&lookup, "STREAMER_RANDOM_MAX_LEN", defaults.random_max_len),
        };

        let pacing_mode = lookup("STREAMER_PACING")
            .map(|s| s.parse::<PacingMode>())
            .transpose()?
            .unwrap_or_default();

        let pacing = PacingSettings {
            mode: pacing_mode,
            interval: parse_duration_millis_or(
                &lookup,
                "STREAMER_INTERVAL_MS",
                PacingSettings::default().interval,
            ),
        };

        let telemetry_defaults = TelemetrySettings::default();
        let telemetry = TelemetrySettings {
            otel_enabled: lookup("OTEL_ENABLED")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(telemetry_defaults.otlp_endpoint),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(telemetry_defaults.service_name),
        };

        Ok(Self {
            server,
            generation,
            pacing,
            telemetry,
        })
    }

    /// Session configuration shared by every connection.
    ///
    /// The random policy has no sample rate, so it always uses the fixed
    /// interval.
    #[must_use]
    pub const fn session_config(&self) -> SessionConfig {
        let pacing = match (self.generation.mode, self.pacing.mode) {
            (GenerationMode::Random, _) | (_, PacingMode::Fixed) => {
                Pacing::Fixed(self.pacing.interval)
            }
            (_, PacingMode::Realtime) => Pacing::Realtime,
        };

        SessionConfig {
            policy: self.generation.policy(),
            pacing,
        }
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

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_duration_millis_or<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
