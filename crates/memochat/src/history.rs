use memochat_core::ConversationState;
use memochat_http::ConversationDetail;
use memochat_model::Role;

/// Builds the conversation state of a stored conversation.
///
/// Messages with roles other than `user` and `assistant` are skipped.
pub fn conversation_from_detail(detail: ConversationDetail) -> ConversationState {
    let history = detail.messages.into_iter().filter_map(|message| {
        let role = match message.role.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => {
                debug!("skipping a stored `{other}` message");
                return None;
            }
        };
        Some((role, message.content))
    });
    ConversationState::from_history(Some(detail.id), history)
}
