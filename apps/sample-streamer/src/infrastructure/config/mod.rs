//! Configuration Module
//!
//! Configuration loading for the streamer service.

mod settings;

pub use settings::{
    ConfigError, GenerationMode, GenerationSettings, PacingMode, PacingSettings, ServerSettings,
    StreamerConfig, TelemetrySettings,
};
