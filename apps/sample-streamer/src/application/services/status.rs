//! Status Query
//!
//! Read-only accessor over the shared stream status, used by the `/status`
//! endpoint while sessions stream concurrently.

use serde::{Deserialize, Serialize};

use crate::domain::stream_state::SharedStreamState;

/// Body of the `/status` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Whether a stream is active.
    pub streaming: bool,
    /// Size of the last pushed chunk.
    pub array_size: usize,
}

/// Status accessor.
#[derive(Debug, Clone)]
pub struct StatusQuery {
    state: SharedStreamState,
}

impl StatusQuery {
    /// Create a query over the shared register.
    #[must_use]
    pub const fn new(state: SharedStreamState) -> Self {
        Self { state }
    }

    /// Current status. Never fails and never waits on a session.
    #[must_use]
    pub fn get(&self) -> StatusResponse {
        let snapshot = self.state.snapshot();
        StatusResponse {
            streaming: snapshot.active,
            array_size: snapshot.last_chunk_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::stream_state::StreamState;

    #[test]
    fn idle_status_before_any_session() {
        let query = StatusQuery::new(Arc::new(StreamState::new()));
        assert_eq!(
            query.get(),
            StatusResponse {
                streaming: false,
                array_size: 0
            }
        );
    }

    #[test]
    fn reflects_latest_write() {
        let state = Arc::new(StreamState::new());
        let query = StatusQuery::new(Arc::clone(&state));

        state.begin_session();
        state.record_chunk(11);
        assert_eq!(
            query.get(),
            StatusResponse {
                streaming: true,
                array_size: 11
            }
        );
    }

    #[test]
    fn response_uses_wire_field_names() {
        let json = serde_json::to_string(&StatusResponse {
            streaming: true,
            array_size: 7,
        })
        .unwrap();
        assert_eq!(json, r#"{"streaming":true,"array_size":7}"#);
    }
}
