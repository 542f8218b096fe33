//! Error taxonomy shared by the controllers.
//!
//! Three failure classes, surfaced at different points:
//! - `ValidationError` — caught locally before any remote call
//! - `GatewayError` (in `gateway`) — transport/server failure, wrapped here
//! - `SessionMismatch` — the assistant changed its session identifier
//!   mid-conversation; the chat session is unusable afterwards

use thiserror::Error;

use crate::gateway::GatewayError;

/// Local validation failure. Blocks the operation before the gateway is
/// touched and is returned synchronously.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} is not valid: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("not a valid {name}: {value:?}")]
    InvalidEnum { name: &'static str, value: String },
}

/// Controller-boundary error. Every failed operation surfaces exactly one
/// of these; the `Display` text is what the presentation layer shows.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] GatewayError),

    #[error("assistant session changed mid-conversation (held {held}, received {received})")]
    SessionMismatch { held: String, received: String },
}

impl CoreError {
    /// Whether retrying the same operation can possibly succeed.
    /// A session mismatch poisons the chat session for good.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoreError::SessionMismatch { .. })
    }
}
