use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The event name used when a frame doesn't carry one.
pub const DEFAULT_EVENT_NAME: &str = "message";

/// An event decoded from one frame of the response stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event name, `"message"` if the frame didn't name it.
    pub name: String,
    /// The payload. Data that is not valid JSON is wrapped as
    /// `{ "text": <raw data> }`.
    pub payload: Value,
}

impl Event {
    /// Creates an event with the given name and payload.
    #[inline]
    pub fn new<S: Into<String>>(name: S, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Returns the string field `key` of the payload, if present.
    #[inline]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}
