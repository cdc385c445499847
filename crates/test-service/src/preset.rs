use memochat_model::Event;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The events in a preset turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    /// A `start` event announcing the conversation id.
    #[serde(rename = "start")]
    Start(String),
    /// A `token` event.
    #[serde(rename = "token")]
    Token(String),
    /// A `tool_call` event with the given payload.
    #[serde(rename = "tool_call")]
    ToolCall(Value),
    /// An `error` event with the given message.
    #[serde(rename = "error")]
    Error(String),
    /// A `done` event.
    #[serde(rename = "done")]
    Done,
    /// Any other event.
    #[serde(rename = "raw")]
    Raw(Event),
}

impl PresetEvent {
    /// Converts the preset into the event the stream delivers.
    pub fn to_event(&self) -> Event {
        match self {
            PresetEvent::Start(chat_id) => {
                Event::new("start", json!({ "chat_id": chat_id }))
            }
            PresetEvent::Token(text) => {
                Event::new("token", json!({ "text": text }))
            }
            PresetEvent::ToolCall(payload) => {
                Event::new("tool_call", payload.clone())
            }
            PresetEvent::Error(message) => {
                Event::new("error", json!({ "message": message }))
            }
            PresetEvent::Done => Event::new("done", json!({})),
            PresetEvent::Raw(event) => event.clone(),
        }
    }
}

/// How a preset stream ends after its events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "reason", rename_all = "snake_case")]
pub enum PresetEnding {
    /// The stream ends normally.
    #[default]
    Finish,
    /// The connection breaks with the given reason.
    TransportFailure(String),
}

/// A rejection of the request before any event is streamed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetRejection {
    /// The status code.
    pub status: u16,
    /// The message the server put in its error body.
    pub message: String,
}

/// The preset response for one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetTurn {
    /// Events in this turn.
    pub events: Vec<PresetEvent>,
    /// How the stream ends.
    #[serde(default)]
    pub ending: PresetEnding,
    /// If set, the request is rejected and `events` are never sent.
    #[serde(default)]
    pub rejection: Option<PresetRejection>,
}

impl PresetTurn {
    /// Creates a `PresetTurn` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
            ..Default::default()
        }
    }

    /// Creates a `PresetTurn` that the server rejects with `status`.
    #[inline]
    pub fn rejected<S: Into<String>>(status: u16, message: S) -> Self {
        Self {
            rejection: Some(PresetRejection {
                status,
                message: message.into(),
            }),
            ..Default::default()
        }
    }

    /// Makes the connection break after the events are sent.
    #[inline]
    pub fn with_transport_failure<S: Into<String>>(mut self, reason: S) -> Self {
        self.ending = PresetEnding::TransportFailure(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let turn = PresetTurn::with_events([
            PresetEvent::Start("c1".to_string()),
            PresetEvent::Token("I have looked it up.".to_string()),
            PresetEvent::ToolCall(json!({
                "tool": "web_search",
                "input": { "query": "weather" }
            })),
            PresetEvent::Done,
        ])
        .with_transport_failure("reset");

        let serialized = serde_json::to_string(&turn).unwrap();
        let deserialized: PresetTurn =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(turn, deserialized);
    }

    #[test]
    fn test_to_event() {
        let event = PresetEvent::ToolCall(json!({ "tool": "calculator" }))
            .to_event();
        assert_eq!(event.name, "tool_call");
        assert_eq!(event.str_field("tool"), Some("calculator"));
    }
}
