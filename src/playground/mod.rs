//! Interactive chat playground.
//!
//! A [`ChatSession`] owns an ordered transcript, builds the completion
//! request from user-tunable parameters (or a raw override body), opens the
//! gateway's streaming endpoint and feeds each delta into the pending
//! assistant message until the end-of-stream sentinel, an error, or
//! cancellation. State changes are observable through a broadcast channel;
//! the embedding UI renders the transcript it reads back.
//!
//! Per assistant turn the status runs `Loading → Incomplete* → Complete`,
//! or ends in `Error` with any partially accumulated content left visible.
//! The session holds a single pending-turn slot: a `send` while a turn is
//! in flight is rejected rather than queued, which makes "at most one
//! assistant message is ever loading" a structural property.

mod payload;
mod session;
mod sse;

pub use payload::PlaygroundParams;
pub use session::{ChatSession, SessionEvent};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::api_types::Role;
use crate::error::ConsoleError;

/// Lifecycle of one transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Assistant placeholder awaiting its first delta.
    Loading,
    /// Some content has streamed in; more may follow.
    Incomplete,
    Complete,
    Error,
}

impl MessageStatus {
    /// Whether the message can still change.
    pub fn is_pending(&self) -> bool {
        matches!(self, MessageStatus::Loading | MessageStatus::Incomplete)
    }
}

/// One transcript entry. Ids are per-session monotonic counters rendered
/// as opaque strings; they reset when the session is recreated.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
}

/// Failures local to the playground. Everything except the transport
/// wrapper is caught before any network call, with the transcript left
/// untouched.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    /// A turn is already streaming; the session does not queue sends.
    #[error("a reply is still in progress")]
    TurnInFlight,

    #[error("custom request body is enabled but empty")]
    EmptyCustomBody,

    #[error("invalid custom request body: {0}")]
    InvalidCustomBody(String),

    #[error("invalid sampling parameters: {0}")]
    InvalidParams(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Console(#[from] ConsoleError),
}

impl From<ChatError> for ConsoleError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::Console(inner) => inner,
            other => ConsoleError::Config(other.to_string()),
        }
    }
}
