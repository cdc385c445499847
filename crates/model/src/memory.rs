use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted fact about the user, owned by the remote service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticMemory {
    /// Identifier assigned by the service.
    #[serde(default)]
    pub id: Option<String>,
    /// The owner of the memory.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Category, e.g. `preference` or `fact`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// What the memory is about.
    pub key: String,
    /// The remembered value.
    pub value: Value,
    /// How sure the service is about this memory.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Creation time (ISO 8601).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update time (ISO 8601).
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// A conversation as listed in the sidebar.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Server-side conversation id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Creation time (ISO 8601).
    pub created_at: String,
    /// Last update time (ISO 8601).
    pub updated_at: String,
    /// Number of stored messages.
    #[serde(default)]
    pub message_count: u64,
}
