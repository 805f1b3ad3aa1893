//! WebSocket Transport
//!
//! Binds a [`StreamSession`] to an upgraded axum WebSocket.
//!
//! The socket is split in two. The write half becomes the session's
//! [`ChunkSink`]; the read half is drained by a watcher task that trips the
//! session's cancellation token when the peer closes or the transport fails.
//! Inbound text and binary frames carry no protocol and are discarded.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ChunkSink, SinkError};
use crate::application::services::{CloseReason, SessionConfig, StreamSession};
use crate::domain::stream_state::SharedStreamState;
use crate::infrastructure::metrics;

// =============================================================================
// Sink
// =============================================================================

/// Write half of a WebSocket, pushing each chunk as one text frame.
pub struct WebSocketSink {
    sender: SplitSink<WebSocket, Message>,
}

impl WebSocketSink {
    /// Wrap the write half of a split socket.
    #[must_use]
    pub const fn new(sender: SplitSink<WebSocket, Message>) -> Self {
        Self { sender }
    }

    /// Send a close frame, ignoring a peer that is already gone.
    pub async fn close(mut self) {
        if let Err(e) = self.sender.close().await {
            tracing::debug!(error = %e, "WebSocket close after session end failed");
        }
    }
}

#[async_trait]
impl ChunkSink for WebSocketSink {
    async fn push(&mut self, payload: String) -> Result<(), SinkError> {
        let bytes = payload.len();
        match self.sender.send(Message::Text(payload.into())).await {
            Ok(()) => {
                metrics::record_chunk_sent(bytes);
                Ok(())
            }
            Err(e) => {
                metrics::record_push_failure();
                Err(SinkError::Transport(e.to_string()))
            }
        }
    }
}

// =============================================================================
// Disconnect Detection
// =============================================================================

/// Drain inbound frames until the peer goes away, then cancel `session`.
///
/// Returns early without cancelling if `session` is cancelled first.
pub async fn watch_for_disconnect(
    mut receiver: SplitStream<WebSocket>,
    session: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = session.cancelled() => return,
            frame = receiver.next() => match frame {
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("Peer closed WebSocket");
                    break;
                }
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "WebSocket read failed");
                    break;
                }
                Some(Ok(_)) => {}
            }
        }
    }
    session.cancel();
}

// =============================================================================
// Session Driver
// =============================================================================

/// Run one streaming session over an upgraded socket until it closes.
///
/// `shutdown` is the server-wide token; the session gets a child of it so a
/// peer disconnect stops only this session.
pub async fn serve_session(
    socket: WebSocket,
    config: &SessionConfig,
    state: &SharedStreamState,
    shutdown: &CancellationToken,
) {
    let (sender, receiver) = socket.split();
    let cancel = shutdown.child_token();

    let mut session = match StreamSession::new(
        config,
        Arc::clone(state),
        WebSocketSink::new(sender),
        cancel.clone(),
    ) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Rejected session with invalid configuration");
            return;
        }
    };

    let watcher = tokio::spawn(watch_for_disconnect(receiver, cancel.clone()));

    metrics::record_session_started();
    let outcome = session.run().await;
    cancel.cancel();

    match outcome {
        Ok(outcome) => {
            metrics::record_session_closed(outcome.duration);
            if matches!(outcome.reason, CloseReason::Cancelled) {
                session.into_sink().close().await;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session did not run");
        }
    }

    if let Err(e) = watcher.await {
        tracing::warn!(error = %e, "Disconnect watcher task failed");
    }
}
