//! Application Layer - Session lifecycle and status queries.
//!
//! This layer drives the domain types through a streaming session and
//! defines the port the transport has to implement.

/// Port interfaces for outbound transports.
pub mod ports;

/// Streaming session and status query services.
pub mod services;
