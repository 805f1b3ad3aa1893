//! Stream Status Register
//!
//! Process-wide record of whether a stream is running and how large the last
//! pushed chunk was. Shared by every streaming session and by the status
//! endpoint.
//!
//! # Design
//!
//! The live session count and the last chunk size sit behind a single mutex
//! so a reader never observes a torn pair. `active` is derived from the count,
//! so it stays true until the last concurrent session ends. Every critical
//! section is a plain field update: no lock is ever held across an `.await`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

/// Consistent view of the stream status at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreamSnapshot {
    /// Whether at least one stream is in progress.
    pub active: bool,
    /// Length of the most recently pushed chunk.
    pub last_chunk_size: usize,
}

#[derive(Debug, Default)]
struct Register {
    live_sessions: usize,
    last_chunk_size: usize,
}

/// Shared status register.
#[derive(Debug, Default)]
pub struct StreamState {
    current: Mutex<Register>,
    sessions_started: AtomicU64,
}

/// Shared handle to the status register.
pub type SharedStreamState = Arc<StreamState>;

impl StreamState {
    /// Create an inactive register with no recorded chunk.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a session as streaming.
    pub fn begin_session(&self) {
        self.current.lock().live_sessions += 1;
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Stop counting a session. Each call must pair with one `begin_session`.
    pub fn end_session(&self) {
        let mut current = self.current.lock();
        current.live_sessions = current.live_sessions.saturating_sub(1);
    }

    /// Record the size of the chunk about to be pushed.
    pub fn record_chunk(&self, size: usize) {
        self.current.lock().last_chunk_size = size;
    }

    /// Read both fields under one lock acquisition.
    #[must_use]
    pub fn snapshot(&self) -> StreamSnapshot {
        let current = self.current.lock();
        StreamSnapshot {
            active: current.live_sessions > 0,
            last_chunk_size: current.last_chunk_size,
        }
    }

    /// Sessions streaming right now.
    #[must_use]
    pub fn live_sessions(&self) -> usize {
        self.current.lock().live_sessions
    }

    /// Number of sessions that have started streaming.
    #[must_use]
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inactive_and_empty() {
        let state = StreamState::new();
        assert_eq!(
            state.snapshot(),
            StreamSnapshot {
                active: false,
                last_chunk_size: 0
            }
        );
        assert_eq!(state.sessions_started(), 0);
        assert_eq!(state.live_sessions(), 0);
    }

    #[test]
    fn records_active_and_chunk_size() {
        let state = StreamState::new();
        state.begin_session();
        state.record_chunk(12);

        let snap = state.snapshot();
        assert!(snap.active);
        assert_eq!(snap.last_chunk_size, 12);

        state.end_session();
        let snap = state.snapshot();
        assert!(!snap.active);
        assert_eq!(snap.last_chunk_size, 12);
        assert_eq!(state.sessions_started(), 1);
    }

    #[test]
    fn stays_active_until_last_session_ends() {
        let state = StreamState::new();
        state.begin_session();
        state.begin_session();
        assert_eq!(state.live_sessions(), 2);

        state.end_session();
        assert!(state.snapshot().active);

        state.end_session();
        assert!(!state.snapshot().active);
        assert_eq!(state.sessions_started(), 2);
    }

    #[test]
    fn unmatched_end_does_not_underflow() {
        let state = StreamState::new();
        state.end_session();
        assert_eq!(state.live_sessions(), 0);

        state.begin_session();
        assert!(state.snapshot().active);
    }

    #[test]
    fn snapshot_serializes_field_names() {
        let json = serde_json::to_value(StreamSnapshot {
            active: true,
            last_chunk_size: 3,
        })
        .unwrap();
        assert_eq!(json["active"], true);
        assert_eq!(json["last_chunk_size"], 3);
    }
}
