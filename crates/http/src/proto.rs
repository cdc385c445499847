use memochat_model::SemanticMemory;
use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MemoriesResponse {
    #[allow(dead_code)]
    pub user_id: Option<String>,
    #[allow(dead_code)]
    pub total: Option<u64>,
    #[serde(default)]
    pub memories: Vec<SemanticMemory>,
}

/// A message stored in a server-side conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// `user` or `assistant`; other roles may appear and are kept as is.
    pub role: String,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// When the message was stored (ISO 8601).
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A server-side conversation with its messages.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationDetail {
    /// Conversation id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Creation time (ISO 8601).
    pub created_at: String,
    /// Last update time (ISO 8601).
    pub updated_at: String,
    /// Stored messages, oldest first.
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// The reply of the non-streaming chat endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatReply {
    /// The whole assistant reply.
    pub reply: String,
    /// The conversation the reply belongs to.
    pub chat_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct DeleteResponse {
    #[allow(dead_code)]
    pub status: String,
    pub chat_id: String,
}
