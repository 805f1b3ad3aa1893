//! Streaming Session
//!
//! Drives one push connection through `Connecting → Streaming → Closed`.
//!
//! While streaming, the session repeatedly:
//!
//! 1. takes the next chunk from its private [`SampleGenerator`]
//! 2. records the chunk size in the shared [`StreamState`]
//! 3. serializes and pushes the chunk through a [`ChunkSink`]
//! 4. sleeps for the pacing interval
//!
//! Both the push and the sleep race the session's cancellation token, which
//! the transport trips when the peer disconnects and the server trips on
//! shutdown. The session's share of the active flag is owned by a drop
//! guard, so it is released exactly once on every exit path, including the
//! session future being dropped mid-await.
//!
//! [`StreamState`]: crate::domain::stream_state::StreamState

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{ChunkMessage, ChunkSink, SinkError};
use crate::domain::generator::{GenerationPolicy, GeneratorError, SampleGenerator};
use crate::domain::stream_state::SharedStreamState;

/// Pacing interval used by the fixed-rate variant and the random policy.
pub const DEFAULT_FIXED_INTERVAL: Duration = Duration::from_millis(500);

// =============================================================================
// Configuration
// =============================================================================

/// How long a session waits between pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Wait for the time one chunk covers at the policy's sample rate.
    ///
    /// Falls back to [`DEFAULT_FIXED_INTERVAL`] for the random policy.
    Realtime,
    /// Wait a fixed interval regardless of the policy.
    Fixed(Duration),
}

/// Parameters every new session is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Sample generation policy.
    pub policy: GenerationPolicy,
    /// Pacing between chunks.
    pub pacing: Pacing,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: GenerationPolicy::Random {
                min_len: 5,
                max_len: 15,
            },
            pacing: Pacing::Fixed(DEFAULT_FIXED_INTERVAL),
        }
    }
}

impl SessionConfig {
    /// Delay between two pushes.
    #[must_use]
    pub fn interval(&self) -> Duration {
        match self.pacing {
            Pacing::Fixed(interval) => interval,
            Pacing::Realtime => self
                .policy
                .realtime_interval()
                .unwrap_or(DEFAULT_FIXED_INTERVAL),
        }
    }

    /// Check the policy and the resulting pacing interval.
    ///
    /// # Errors
    ///
    /// Returns `SessionConfigError` if the policy is invalid or the interval
    /// is zero.
    pub fn validate(&self) -> Result<(), SessionConfigError> {
        self.policy.validate()?;
        if self.interval().is_zero() {
            return Err(SessionConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// Invalid session configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionConfigError {
    /// The generation policy is invalid.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Pacing interval must be positive.
    #[error("pacing interval must be greater than zero")]
    ZeroInterval,
}

// =============================================================================
// Session State
// =============================================================================

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Handshake accepted, nothing pushed yet.
    Connecting,
    /// Pushing chunks.
    Streaming,
    /// Terminal.
    Closed,
}

/// Why a session stopped streaming.
#[derive(Debug)]
pub enum CloseReason {
    /// The cancellation token fired (peer disconnect or shutdown).
    Cancelled,
    /// A push failed.
    PushFailed(SinkError),
}

/// Summary of a finished session.
#[derive(Debug)]
pub struct SessionOutcome {
    /// Session identifier.
    pub session_id: Uuid,
    /// Chunks pushed successfully.
    pub chunks_sent: u64,
    /// Why the session closed.
    pub reason: CloseReason,
    /// Time spent streaming.
    pub duration: Duration,
}

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `run` was called on a session that is not in `Connecting`.
    #[error("session cannot start from phase {0:?}")]
    InvalidPhase(SessionPhase),
}

/// Counts this session as live in the shared state for the lifetime of a
/// streaming loop.
struct ActiveGuard {
    state: SharedStreamState,
}

impl ActiveGuard {
    fn engage(state: SharedStreamState) -> Self {
        state.begin_session();
        Self { state }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.state.end_session();
    }
}

// =============================================================================
// Session
// =============================================================================

/// One streaming connection.
pub struct StreamSession<S> {
    id: Uuid,
    phase: SessionPhase,
    generator: SampleGenerator,
    interval: Duration,
    state: SharedStreamState,
    sink: S,
    cancel: CancellationToken,
    chunks_sent: u64,
}

impl<S: ChunkSink> StreamSession<S> {
    /// Create a session with a fresh generator built from `config`.
    ///
    /// # Errors
    ///
    /// Returns `SessionConfigError` if the configuration is invalid; the
    /// shared state is left untouched.
    pub fn new(
        config: &SessionConfig,
        state: SharedStreamState,
        sink: S,
        cancel: CancellationToken,
    ) -> Result<Self, SessionConfigError> {
        config.validate()?;
        let generator = SampleGenerator::new(&config.policy)?;
        Ok(Self::with_generator(
            generator,
            config.interval(),
            state,
            sink,
            cancel,
        ))
    }

    /// Create a session around an existing generator.
    #[must_use]
    pub fn with_generator(
        generator: SampleGenerator,
        interval: Duration,
        state: SharedStreamState,
        sink: S,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Connecting,
            generator,
            interval,
            state,
            sink,
            cancel,
            chunks_sent: 0,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Chunks pushed so far.
    #[must_use]
    pub const fn chunks_sent(&self) -> u64 {
        self.chunks_sent
    }

    /// Give back the sink, e.g. to close the transport once the session ends.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Stream until the peer disconnects, a push fails or the session is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` if the session has already run.
    pub async fn run(&mut self) -> Result<SessionOutcome, SessionError> {
        if self.phase != SessionPhase::Connecting {
            return Err(SessionError::InvalidPhase(self.phase));
        }

        let started = Instant::now();
        let active = ActiveGuard::engage(Arc::clone(&self.state));
        self.phase = SessionPhase::Streaming;

        tracing::info!(
            session_id = %self.id,
            interval_ms = self.interval.as_millis(),
            "Streaming session started"
        );

        let reason = self.stream().await;

        self.phase = SessionPhase::Closed;
        drop(active);

        match &reason {
            CloseReason::Cancelled => {
                tracing::info!(
                    session_id = %self.id,
                    chunks_sent = self.chunks_sent,
                    "Streaming session closed"
                );
            }
            CloseReason::PushFailed(e) => {
                tracing::info!(
                    session_id = %self.id,
                    chunks_sent = self.chunks_sent,
                    error = %e,
                    "Streaming session closed after push failure"
                );
            }
        }

        Ok(SessionOutcome {
            session_id: self.id,
            chunks_sent: self.chunks_sent,
            reason,
            duration: started.elapsed(),
        })
    }

    async fn stream(&mut self) -> CloseReason {
        loop {
            if self.cancel.is_cancelled() {
                return CloseReason::Cancelled;
            }

            let chunk = self.generator.next_chunk();
            self.state.record_chunk(chunk.len());

            let payload = match ChunkMessage::new(&chunk).to_json() {
                Ok(payload) => payload,
                Err(e) => return CloseReason::PushFailed(e.into()),
            };

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return CloseReason::Cancelled,
                result = self.sink.push(payload) => {
                    if let Err(e) = result {
                        return CloseReason::PushFailed(e);
                    }
                }
            }
            self.chunks_sent += 1;

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return CloseReason::Cancelled,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
