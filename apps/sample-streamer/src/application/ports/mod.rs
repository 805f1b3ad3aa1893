//! Port Interfaces
//!
//! Defines the contract a push transport must satisfy so the streaming
//! session can run against a WebSocket in production and an in-memory sink in
//! tests.
//!
//! ## Driven Ports (Outbound)
//!
//! - `ChunkSink`: delivers one serialized chunk message to the client

use async_trait::async_trait;
use serde::Serialize;

/// Wire format of a pushed chunk: `{"data": [f0, f1, ...]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChunkMessage<'a> {
    /// Samples in generation order.
    pub data: &'a [f64],
}

impl<'a> ChunkMessage<'a> {
    /// Wrap a chunk for serialization.
    #[must_use]
    pub const fn new(data: &'a [f64]) -> Self {
        Self { data }
    }

    /// Serialize to the JSON text sent over the transport.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Errors raised while pushing a chunk.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The peer has gone away.
    #[error("connection closed")]
    Closed,

    /// The transport rejected the write.
    #[error("transport error: {0}")]
    Transport(String),

    /// The chunk could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outbound transport for chunk messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChunkSink: Send {
    /// Push one serialized chunk message.
    async fn push(&mut self, payload: String) -> Result<(), SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_message_wire_format() {
        let json = ChunkMessage::new(&[0.0, 0.5, -1.0]).to_json().unwrap();
        assert_eq!(json, r#"{"data":[0.0,0.5,-1.0]}"#);
    }

    #[test]
    fn empty_chunk_serializes_to_empty_array() {
        let json = ChunkMessage::new(&[]).to_json().unwrap();
        assert_eq!(json, r#"{"data":[]}"#);
    }
}
