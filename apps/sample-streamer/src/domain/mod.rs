//! Domain Layer - Sample generation and shared stream status.
//!
//! Pure types with no I/O: the generator that produces sample chunks and the
//! status register shared between sessions and the status endpoint.

/// Sample generation policies and the per-session generator.
pub mod generator;

/// Process-wide stream status register.
pub mod stream_state;
