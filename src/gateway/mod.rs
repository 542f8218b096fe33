//! Remote resource gateway — the typed seam between the controllers and
//! whatever transport reaches the clinic service.
//!
//! Two traits, two production clients, two emulation doubles:
//! - `CollectionTransport` / `RestGateway` / `InMemoryClinic` — the
//!   list/create/update/delete contract per collection
//! - `AssistantTransport` / `HttpAssistant` / `ScriptedAssistant` — the
//!   single-operation chat completion contract

pub mod memory;
pub mod rest;

pub use memory::{InMemoryClinic, ScriptedAssistant};
pub use rest::{ClientContext, HttpAssistant, RestGateway};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::Resource;

/// Uniform failure shape for every gateway call. The `Display` text is the
/// human-readable notification shown to staff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("cannot reach the clinic service at {0}")]
    Connection(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Non-success HTTP status. `message` prefers the server-supplied
    /// detail and falls back to a generic per-operation message.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("invalid response from the clinic service: {0}")]
    ResponseParsing(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// The four-verb contract a collection transport must satisfy. The
/// controllers depend only on this shape and tolerate any implementation
/// (HTTP, RPC, local emulation).
///
/// A failed call must not have mutated anything the caller can observe.
#[allow(async_fn_in_trait)]
pub trait CollectionTransport<R: Resource> {
    async fn list(&self) -> Result<Vec<R>, GatewayError>;
    async fn create(&self, fields: &R::Draft) -> Result<R, GatewayError>;
    async fn update(&self, id: &str, fields: &R::Patch) -> Result<R, GatewayError>;
    async fn delete(&self, id: &str) -> Result<(), GatewayError>;
}

/// One turn of the assistant conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub response: String,
    pub session_id: String,
}

/// The chat completion contract: one message in, one reply out, with the
/// service-assigned session identifier echoed (or minted on first turn).
#[allow(async_fn_in_trait)]
pub trait AssistantTransport {
    async fn send(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<AssistantReply, GatewayError>;
}

// A shared handle to a transport is itself a transport. Lets several
// controllers talk through one emulated service instance.
impl<R: Resource, T: CollectionTransport<R>> CollectionTransport<R> for std::sync::Arc<T> {
    async fn list(&self) -> Result<Vec<R>, GatewayError> {
        self.as_ref().list().await
    }

    async fn create(&self, fields: &R::Draft) -> Result<R, GatewayError> {
        self.as_ref().create(fields).await
    }

    async fn update(&self, id: &str, fields: &R::Patch) -> Result<R, GatewayError> {
        self.as_ref().update(id, fields).await
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        self.as_ref().delete(id).await
    }
}

impl<T: AssistantTransport> AssistantTransport for std::sync::Arc<T> {
    async fn send(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<AssistantReply, GatewayError> {
        self.as_ref().send(message, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_its_message_only() {
        let err = GatewayError::Status {
            status: 404,
            message: "Patient not found".into(),
        };
        assert_eq!(err.to_string(), "Patient not found");
    }

    #[test]
    fn connection_error_names_the_endpoint() {
        let err = GatewayError::Connection("http://localhost:8000/api".into());
        assert!(err.to_string().contains("http://localhost:8000/api"));
    }
}
