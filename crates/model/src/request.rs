use serde::{Deserialize, Serialize};

/// The body of a chat request, streaming or not.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnRequest {
    /// The user's message text.
    pub message: String,
    /// The server-side conversation to continue. `None` lets the server
    /// start a new one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl TurnRequest {
    /// Creates a request that continues `chat_id`, if any.
    #[inline]
    pub fn new<S: Into<String>>(message: S, chat_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            chat_id,
        }
    }
}
