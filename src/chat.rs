//! Chat session — multi-turn conversation with the health assistant.
//!
//! The controller owns an append-only transcript, a pending-reply guard,
//! and the service-assigned session identifier. The identifier is captured
//! from the first successful reply and echoed unchanged on every later
//! turn; the service answering with a different one is a protocol
//! violation that poisons the session.

use serde::Serialize;

use crate::error::CoreError;
use crate::gateway::AssistantTransport;
use crate::models::ChatRole;

/// Local greeting seeded into every fresh transcript. Never sent to the
/// backend.
pub const GREETING: &str = "Hello! I'm the SmartClinic assistant. I can help you with general \
     health information, answer questions about symptoms, and provide guidance on \
     appointments. How can I assist you today?";

/// Assistant turn appended when a send fails, so no user turn is left
/// without a response.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble connecting right now. Please try again.";

/// One transcript entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// What `send` did with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Request went out and a reply (or fallback) landed in the transcript.
    Delivered,
    /// Blank input, a reply already outstanding, or a poisoned session.
    Ignored,
}

pub struct ChatController<A: AssistantTransport> {
    assistant: A,
    session_id: Option<String>,
    transcript: Vec<ChatTurn>,
    pending: bool,
    /// Set when the service violated the session contract; the controller
    /// refuses further sends for its lifetime.
    poisoned: bool,
}

impl<A: AssistantTransport> ChatController<A> {
    pub fn new(assistant: A) -> Self {
        Self {
            assistant,
            session_id: None,
            transcript: vec![ChatTurn {
                role: ChatRole::Assistant,
                text: GREETING.to_string(),
            }],
            pending: false,
            poisoned: false,
        }
    }

    // ── Read state ──────────────────────────────────────────

    /// Conversation so far, in turn order.
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    // ── Sending ─────────────────────────────────────────────

    /// Send one user message and wait for the reply.
    ///
    /// The user turn is appended optimistically before the request goes
    /// out. A failed request appends the fixed fallback turn and surfaces
    /// the error; the session identifier is untouched either way.
    pub async fn send(&mut self, text: &str) -> Result<SendOutcome, CoreError> {
        let text = text.trim();
        if text.is_empty() || self.pending || self.poisoned {
            tracing::debug!(
                pending = self.pending,
                poisoned = self.poisoned,
                "chat send ignored"
            );
            return Ok(SendOutcome::Ignored);
        }

        self.transcript.push(ChatTurn {
            role: ChatRole::User,
            text: text.to_string(),
        });
        self.pending = true;

        let result = self.assistant.send(text, self.session_id.as_deref()).await;
        self.pending = false;

        match result {
            Ok(reply) => {
                if let Some(held) = self.session_id.clone() {
                    if held != reply.session_id {
                        tracing::error!(
                            %held,
                            received = %reply.session_id,
                            "assistant session identifier changed mid-conversation"
                        );
                        self.poisoned = true;
                        self.push_assistant(FALLBACK_REPLY);
                        return Err(CoreError::SessionMismatch {
                            held,
                            received: reply.session_id,
                        });
                    }
                } else {
                    self.session_id = Some(reply.session_id.clone());
                    tracing::info!(session_id = %reply.session_id, "chat session established");
                }
                self.push_assistant(&reply.response);
                Ok(SendOutcome::Delivered)
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat send failed");
                self.push_assistant(FALLBACK_REPLY);
                Err(err.into())
            }
        }
    }

    fn push_assistant(&mut self, text: &str) {
        self.transcript.push(ChatTurn {
            role: ChatRole::Assistant,
            text: text.to_string(),
        });
    }
}
