//! The turn state machine that applies stream events to a conversation.

use std::mem;

use memochat_model::{Event, MessageStatus};
use serde_json::Value;

use crate::conversation::{ConversationState, append_annotation};

const DEFAULT_TOOL_LABEL: &str = "tool";
const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// The phase of a turn.
///
/// ```text
/// AwaitingFirstEvent -> Streaming -> { Complete, Failed }
/// ```
///
/// A turn may also fail straight from `AwaitingFirstEvent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// The request is sent, no event has changed the reply yet.
    AwaitingFirstEvent,
    /// Tokens or tool calls are arriving.
    Streaming,
    /// The stream ended normally.
    Complete,
    /// The server reported an error, the request was rejected, or the
    /// connection broke.
    Failed,
}

impl TurnPhase {
    /// Returns `true` for `Complete` and `Failed`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::Complete | TurnPhase::Failed)
    }

    #[inline]
    fn message_status(self) -> MessageStatus {
        match self {
            TurnPhase::AwaitingFirstEvent => MessageStatus::Pending,
            TurnPhase::Streaming => MessageStatus::Streaming,
            TurnPhase::Complete => MessageStatus::Complete,
            TurnPhase::Failed => MessageStatus::Error,
        }
    }
}

/// Something that happened to the active turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnInput {
    /// An event decoded from the stream.
    Event(Event),
    /// The stream ended without a transport failure.
    Finished,
    /// The connection failed, before or while streaming.
    TransportFailed(String),
    /// The server rejected the request before streaming.
    Rejected(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Turn {
    pub(crate) assistant_idx: usize,
    pub(crate) phase: TurnPhase,
    // The content ends with a tool annotation, the next text goes on a new
    // line.
    after_tool: bool,
}

impl Turn {
    #[inline]
    pub(crate) fn new(assistant_idx: usize) -> Self {
        Self {
            assistant_idx,
            phase: TurnPhase::AwaitingFirstEvent,
            after_tool: false,
        }
    }
}

/// Applies `input` to `state` and returns the new state.
///
/// This is the pure form of [`ConversationState::apply`].
#[inline]
pub fn reduce(mut state: ConversationState, input: TurnInput) -> ConversationState {
    state.apply(input);
    state
}

impl ConversationState {
    /// Applies `input` to the active turn and returns the phase the turn
    /// is in afterwards.
    ///
    /// Returns `None` if no turn is active, in which case nothing changes:
    /// once a turn is complete or failed, later inputs are ignored.
    pub fn apply(&mut self, input: TurnInput) -> Option<TurnPhase> {
        let mut after_tool =
            self.turn.as_ref().is_some_and(|turn| turn.after_tool);
        let Some(message) = self.active_message_mut() else {
            debug!("no active turn, ignoring {input:?}");
            return None;
        };
        let content = &mut message.content;

        let next_phase = match input {
            TurnInput::Event(event) => match event.name.as_str() {
                "token" => {
                    let text =
                        event.str_field("text").filter(|t| !t.is_empty());
                    if let Some(text) = text {
                        if mem::take(&mut after_tool) {
                            content.push('\n');
                        }
                        content.push_str(text);
                    }
                    Some(TurnPhase::Streaming)
                }
                "tool_call" => {
                    append_annotation(content, &tool_annotation(&event.payload));
                    after_tool = true;
                    Some(TurnPhase::Streaming)
                }
                "error" => {
                    let reason = event
                        .str_field("message")
                        .unwrap_or(DEFAULT_ERROR_MESSAGE);
                    warn!("the server reported an error: {reason}");
                    append_annotation(content, &format!("[error] {reason}"));
                    Some(TurnPhase::Failed)
                }
                "start" => {
                    if let Some(chat_id) = event.str_field("chat_id") {
                        self.chat_id = Some(chat_id.to_owned());
                    }
                    None
                }
                name => {
                    trace!("ignoring event `{name}`");
                    None
                }
            },
            TurnInput::Finished => Some(TurnPhase::Complete),
            TurnInput::TransportFailed(reason) => {
                append_annotation(content, &format!("[connection lost] {reason}"));
                Some(TurnPhase::Failed)
            }
            TurnInput::Rejected(reason) => {
                append_annotation(content, &format!("[error] {reason}"));
                Some(TurnPhase::Failed)
            }
        };

        let turn = self.turn.as_mut()?;
        turn.after_tool = after_tool;
        if let Some(phase) = next_phase {
            if phase != turn.phase {
                debug!("turn phase: {:?} -> {phase:?}", turn.phase);
            }
            turn.phase = phase;
            let idx = turn.assistant_idx;
            self.messages[idx].status = phase.message_status();
        }
        Some(turn.phase)
    }
}

/// Formats a tool call as `[tool:<name>] <payload>`.
fn tool_annotation(payload: &Value) -> String {
    let name = payload
        .pointer("/tool_call/name")
        .and_then(Value::as_str)
        .or_else(|| payload.get("tool").and_then(Value::as_str))
        .unwrap_or(DEFAULT_TOOL_LABEL);
    format!("[tool:{name}] {payload}")
}
