//! Application Services
//!
//! - `StreamSession`: drives one push connection from handshake to close
//! - `StatusQuery`: read-only view of the shared stream status

mod session;
mod status;

pub use session::{
    CloseReason, DEFAULT_FIXED_INTERVAL, Pacing, SessionConfig, SessionConfigError, SessionError,
    SessionOutcome, SessionPhase, StreamSession,
};
pub use status::{StatusQuery, StatusResponse};
