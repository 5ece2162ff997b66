use serde::{Deserialize, Serialize};

/// Message role on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A `{role, content}` pair as sent to the completion endpoint. Session
/// bookkeeping (ids, statuses, timestamps) is stripped before transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request body for `POST /pg/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<Message>,
    pub model: String,
    #[serde(default)]
    pub group: String,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    pub stream: bool,
}

/// One parsed streaming chunk of a completion response.
///
/// Only the fields the playground consumes are modeled; providers attach
/// plenty more that is deliberately ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkContent>,
    /// Non-streaming fallback shape some providers emit mid-stream.
    #[serde(default)]
    pub message: Option<ChunkContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkContent {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Incremental text carried by this chunk, preferring the delta field
    /// and falling back to the full-message field. `None` for control
    /// chunks that carry no content.
    pub fn delta_text(&self) -> Option<&str> {
        let choice = self.choices.first()?;
        choice
            .delta
            .as_ref()
            .and_then(|d| d.content.as_deref())
            .or_else(|| choice.message.as_ref().and_then(|m| m.content.as_deref()))
    }
}
