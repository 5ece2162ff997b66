//! The chat session and its streaming turn loop.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use validator::Validate;

use super::payload::PlaygroundParams;
use super::sse::{DONE_SENTINEL, SseLineReader, data_payload};
use super::{ChatError, ChatMessage, MessageStatus};
use crate::api_types::{ChatCompletionChunk, Message, Role};
use crate::client::GatewayClient;

/// Ids are minted from a per-session counter.
const FIRST_MESSAGE_ID: u64 = 100;

/// Session change notifications, the headless analogue of a UI re-render.
/// Delivered on a broadcast channel; slow subscribers may observe lag but
/// the transcript itself is always read back consistently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user message and its assistant placeholder were appended.
    TurnStarted {
        user_id: String,
        assistant_id: String,
    },
    /// The pending assistant message grew by one delta.
    Delta { assistant_id: String },
    TurnCompleted { assistant_id: String },
    TurnFailed { assistant_id: String },
}

struct SessionState {
    messages: Vec<ChatMessage>,
    next_id: u64,
    /// Id of the assistant message currently receiving deltas. At most one.
    pending: Option<String>,
}

impl SessionState {
    fn mint_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }
}

/// An interactive conversation against the gateway's playground endpoint.
pub struct ChatSession {
    client: Arc<GatewayClient>,
    params: Mutex<PlaygroundParams>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    idle_timeout: Duration,
}

impl ChatSession {
    /// `idle_timeout` bounds the wait between streamed chunks; zero
    /// disables the check.
    pub fn new(
        client: Arc<GatewayClient>,
        params: PlaygroundParams,
        idle_timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            client,
            params: Mutex::new(params),
            state: Arc::new(Mutex::new(SessionState {
                messages: Vec::new(),
                next_id: FIRST_MESSAGE_ID,
                pending: None,
            })),
            events,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            idle_timeout,
        }
    }

    /// Snapshot of the transcript in order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().messages.clone()
    }

    /// Whether an assistant turn is currently streaming.
    pub fn has_pending_turn(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn params(&self) -> PlaygroundParams {
        self.params.lock().clone()
    }

    /// Replace the request parameters for subsequent turns.
    pub fn set_params(&self, params: PlaygroundParams) {
        *self.params.lock() = params;
    }

    /// Send a user message and start streaming its reply.
    ///
    /// Parameter validation and payload construction happen before any
    /// state changes, so a configuration error leaves the transcript
    /// untouched. On success the user message (`Complete`) and the
    /// assistant placeholder (`Loading`) are appended in one state update;
    /// no observer sees one without the other.
    ///
    /// Must be called within a Tokio runtime; the stream task is spawned
    /// onto it.
    pub fn send(&self, text: &str) -> Result<(), ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let params = self.params.lock().clone();
        params.validate()?;

        let mut state = self.state.lock();
        if state.pending.is_some() {
            return Err(ChatError::TurnInFlight);
        }

        // Wire-shaped conversation: system prompt first, bookkeeping
        // fields stripped, the new user text last.
        let mut conversation: Vec<Message> =
            Vec::with_capacity(state.messages.len() + 2);
        conversation.extend(params.system_message());
        conversation.extend(
            state
                .messages
                .iter()
                .map(|message| Message::new(message.role, message.content.clone())),
        );
        conversation.push(Message::new(Role::User, text));

        let payload = params.build_payload(&conversation)?;

        let user_id = state.mint_id();
        let assistant_id = state.mint_id();
        let now = Utc::now();
        state.messages.push(ChatMessage {
            id: user_id.clone(),
            role: Role::User,
            content: text.to_string(),
            created_at: now,
            status: MessageStatus::Complete,
        });
        state.messages.push(ChatMessage {
            id: assistant_id.clone(),
            role: Role::Assistant,
            content: String::new(),
            created_at: now,
            status: MessageStatus::Loading,
        });
        state.pending = Some(assistant_id.clone());
        drop(state);

        let _ = self.events.send(SessionEvent::TurnStarted {
            user_id,
            assistant_id: assistant_id.clone(),
        });

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let cancel = self.cancel.child_token();
        let idle_timeout = self.idle_timeout;
        self.tracker.spawn(async move {
            let status = run_stream(
                &client,
                &state,
                &events,
                &cancel,
                idle_timeout,
                &payload,
                &assistant_id,
            )
            .await;
            finish_turn(&state, &events, &assistant_id, status);
        });
        Ok(())
    }

    /// Cancel the in-flight stream, if any, and stop accepting new tasks.
    /// A still-pending turn is marked `Error`, keeping its partial content.
    pub fn close(&self) {
        self.cancel.cancel();
        self.tracker.close();
    }

    /// Wait for spawned stream tasks to wind down. Call after [`close`].
    pub async fn wait_idle(&self) {
        self.tracker.wait().await;
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_stream(
    client: &GatewayClient,
    state: &Mutex<SessionState>,
    events: &broadcast::Sender<SessionEvent>,
    cancel: &CancellationToken,
    idle_timeout: Duration,
    payload: &serde_json::Value,
    assistant_id: &str,
) -> MessageStatus {
    let response = tokio::select! {
        _ = cancel.cancelled() => return MessageStatus::Error,
        response = client.chat_completions(payload) => match response {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "completion request failed");
                return MessageStatus::Error;
            }
        },
    };

    let mut body = response.bytes_stream();
    let mut reader = SseLineReader::new();
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => return MessageStatus::Error,
            chunk = next_chunk(&mut body, idle_timeout) => chunk,
        };
        let bytes = match chunk {
            NextChunk::Data(bytes) => bytes,
            // A clean end of stream completes the turn even if the
            // sentinel never arrived.
            NextChunk::End => return MessageStatus::Complete,
            NextChunk::TransportError | NextChunk::IdleTimeout => {
                return MessageStatus::Error;
            }
        };
        for line in reader.push(&bytes) {
            let Some(data) = data_payload(&line) else {
                continue;
            };
            if data == DONE_SENTINEL {
                // Anything after the sentinel is ignored.
                return MessageStatus::Complete;
            }
            match serde_json::from_str::<ChatCompletionChunk>(data) {
                Ok(chunk) => {
                    if let Some(delta) = chunk.delta_text()
                        && !delta.is_empty()
                    {
                        append_delta(state, events, assistant_id, delta);
                    }
                }
                // Providers interleave non-content control chunks;
                // skipping them is tolerance, not data loss.
                Err(error) => {
                    tracing::debug!(%error, "skipping unparseable stream chunk")
                }
            }
        }
    }
}

enum NextChunk {
    Data(Bytes),
    End,
    TransportError,
    IdleTimeout,
}

async fn next_chunk<S, E>(body: &mut S, idle_timeout: Duration) -> NextChunk
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let next = if idle_timeout.is_zero() {
        body.next().await
    } else {
        match tokio::time::timeout(idle_timeout, body.next()).await {
            Ok(next) => next,
            Err(_) => {
                tracing::warn!("stream stalled past the idle timeout");
                return NextChunk::IdleTimeout;
            }
        }
    };
    match next {
        Some(Ok(bytes)) => NextChunk::Data(bytes),
        Some(Err(error)) => {
            tracing::warn!(%error, "stream transport error");
            NextChunk::TransportError
        }
        None => NextChunk::End,
    }
}

fn append_delta(
    state: &Mutex<SessionState>,
    events: &broadcast::Sender<SessionEvent>,
    assistant_id: &str,
    delta: &str,
) {
    let mut state = state.lock();
    if let Some(message) = state
        .messages
        .iter_mut()
        .find(|message| message.id == assistant_id)
    {
        message.content.push_str(delta);
        message.status = MessageStatus::Incomplete;
    }
    drop(state);
    let _ = events.send(SessionEvent::Delta {
        assistant_id: assistant_id.to_string(),
    });
}

fn finish_turn(
    state: &Mutex<SessionState>,
    events: &broadcast::Sender<SessionEvent>,
    assistant_id: &str,
    status: MessageStatus,
) {
    let mut state = state.lock();
    if state.pending.as_deref() != Some(assistant_id) {
        return;
    }
    state.pending = None;
    if let Some(message) = state
        .messages
        .iter_mut()
        .find(|message| message.id == assistant_id)
    {
        message.status = status;
    }
    drop(state);
    let event = if status == MessageStatus::Error {
        SessionEvent::TurnFailed {
            assistant_id: assistant_id.to_string(),
        }
    } else {
        SessionEvent::TurnCompleted {
            assistant_id: assistant_id.to_string(),
        }
    };
    let _ = events.send(event);
}
