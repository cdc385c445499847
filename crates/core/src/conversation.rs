//! Conversation-related types.

use memochat_model::{Message, MessageId, MessageStatus, Role};

use crate::turn::{Turn, TurnPhase};

/// The ordered messages of a conversation, as the UI renders them.
///
/// Messages are only appended, except the assistant message of the active
/// turn, which grows in place while events arrive. State changes go
/// through [`ConversationState::begin_turn`] and
/// [`ConversationState::apply`] (or [`reduce`](crate::reduce)).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationState {
    pub(crate) messages: Vec<Message>,
    pub(crate) turn: Option<Turn>,
    pub(crate) chat_id: Option<String>,
    next_id: u64,
}

impl ConversationState {
    /// Creates an empty conversation.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a conversation from messages stored on the server.
    pub fn from_history<I>(chat_id: Option<String>, history: I) -> Self
    where
        I: IntoIterator<Item = (Role, String)>,
    {
        let mut state = Self {
            chat_id,
            ..Default::default()
        };
        for (role, content) in history {
            state.push_message(role, content, MessageStatus::Complete);
        }
        state
    }

    /// Returns the messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the server-side conversation id, once known.
    #[inline]
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    /// Returns `true` while a turn is waiting for or receiving events.
    #[inline]
    pub fn is_turn_active(&self) -> bool {
        self.turn.as_ref().is_some_and(|turn| !turn.phase.is_terminal())
    }

    /// Returns the phase of the most recent turn, if any was started.
    #[inline]
    pub fn turn_phase(&self) -> Option<TurnPhase> {
        self.turn.as_ref().map(|turn| turn.phase)
    }

    /// Returns the assistant message of the most recent turn.
    pub fn turn_message(&self) -> Option<&Message> {
        let turn = self.turn.as_ref()?;
        self.messages.get(turn.assistant_idx)
    }

    /// Starts a turn: appends the user message and an empty assistant
    /// message, and returns the id of the latter.
    ///
    /// Refusing to start a turn while another one is active is up to the
    /// caller. If it happens anyway, the previous assistant message stops
    /// receiving updates and keeps its last status.
    pub fn begin_turn<S: Into<String>>(&mut self, text: S) -> MessageId {
        if self.is_turn_active() {
            warn!("a turn is started while the previous one is still active");
        }

        self.push_message(Role::User, text.into(), MessageStatus::Complete);
        let id = self.push_message(
            Role::Assistant,
            String::new(),
            MessageStatus::Pending,
        );
        self.turn = Some(Turn::new(self.messages.len() - 1));
        id
    }

    /// Discards all messages and forgets the server-side conversation.
    ///
    /// Ids are never reused, even after clearing.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.turn = None;
        self.chat_id = None;
    }

    fn push_message(
        &mut self,
        role: Role,
        content: String,
        status: MessageStatus,
    ) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            content,
            status,
        });
        id
    }

    /// Returns the assistant message of the active turn.
    pub(crate) fn active_message_mut(&mut self) -> Option<&mut Message> {
        let turn = self.turn.as_ref().filter(|turn| !turn.phase.is_terminal())?;
        self.messages.get_mut(turn.assistant_idx)
    }
}

/// Appends `line` to `content`, starting a new line unless `content` is
/// empty or already ends with one.
pub(crate) fn append_annotation(content: &mut String, line: &str) {
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_turn() {
        let mut state = ConversationState::new();
        assert!(!state.is_turn_active());
        assert_eq!(state.turn_phase(), None);

        let id = state.begin_turn("Hi");
        assert!(state.is_turn_active());
        assert_eq!(state.turn_phase(), Some(TurnPhase::AwaitingFirstEvent));

        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Hi");
        assert_eq!(messages[0].status, MessageStatus::Complete);
        assert_eq!(messages[1].id, id);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "");
        assert_eq!(messages[1].status, MessageStatus::Pending);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut state = ConversationState::from_history(
            Some("c1".to_owned()),
            [
                (Role::User, "a".to_owned()),
                (Role::Assistant, "b".to_owned()),
            ],
        );
        state.begin_turn("c");
        let before_clear = state.messages().last().unwrap().id;
        state.clear();
        assert_eq!(state.chat_id(), None);
        state.begin_turn("d");

        let ids: Vec<_> = state.messages().iter().map(|m| m.id).collect();
        assert!(ids.iter().all(|id| *id > before_clear));
        assert_eq!(before_clear, MessageId(3));
        assert_eq!(ids, vec![MessageId(4), MessageId(5)]);
    }

    #[test]
    fn test_append_annotation() {
        let mut content = String::new();
        append_annotation(&mut content, "[a]");
        assert_eq!(content, "[a]");
        append_annotation(&mut content, "[b]");
        assert_eq!(content, "[a]\n[b]");
        content.push('\n');
        append_annotation(&mut content, "[c]");
        assert_eq!(content, "[a]\n[b]\n[c]");
    }
}
