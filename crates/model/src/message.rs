use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifier of a message, unique within one conversation session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MessageId(pub u64);

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "msg:{}", self.0)
    }
}

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the client.
    User,
    /// The remote conversational service.
    Assistant,
}

/// Lifecycle status of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// The request was sent but nothing has arrived yet.
    Pending,
    /// Events are arriving and the content is growing.
    Streaming,
    /// The message is final.
    Complete,
    /// The turn failed; the content ends with a failure annotation.
    Error,
}

/// A message rendered in the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// The identifier, stable for the life of the turn.
    pub id: MessageId,
    /// The author.
    pub role: Role,
    /// Text content. For an assistant message this starts empty and only
    /// grows while its turn is active.
    pub content: String,
    /// Current status.
    pub status: MessageStatus,
}
