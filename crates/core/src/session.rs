use memochat_model::{
    ChatService, ChatServiceError, ErrorKind, SemanticMemory, TurnRequest,
};
use tracing::Instrument;

use crate::client::ChatClient;
use crate::conversation::ConversationState;
use crate::turn::{TurnInput, TurnPhase};

type UpdateFn = Box<dyn FnMut(&ConversationState) + Send>;

/// [`Session`] builder.
pub struct SessionBuilder {
    client: ChatClient,
    state: ConversationState,
    on_update: Option<UpdateFn>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified chat service.
    #[inline]
    pub fn with_chat_service<S: ChatService + 'static>(service: S) -> Self {
        Self {
            client: ChatClient::new(service),
            state: ConversationState::new(),
            on_update: None,
        }
    }

    /// Starts the session with an existing conversation.
    #[inline]
    pub fn with_conversation(mut self, state: ConversationState) -> Self {
        self.state = state;
        self
    }

    /// Attaches a callback to be invoked whenever the conversation state
    /// changes, e.g. to re-render it.
    #[inline]
    pub fn on_update(
        mut self,
        on_update: impl FnMut(&ConversationState) + Send + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(on_update));
        self
    }

    /// Builds the session.
    #[inline]
    pub fn build(self) -> Session {
        Session {
            client: self.client,
            state: self.state,
            memories: vec![],
            on_update: self.on_update,
        }
    }
}

/// A chat session: one conversation, the remote service it talks to, and
/// the semantic memories the service holds about the user.
pub struct Session {
    client: ChatClient,
    state: ConversationState,
    memories: Vec<SemanticMemory>,
    on_update: Option<UpdateFn>,
}

impl Session {
    /// Returns the conversation state.
    #[inline]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Replaces the conversation, e.g. after switching to another one.
    #[inline]
    pub fn set_conversation(&mut self, state: ConversationState) {
        self.state = state;
        self.notify();
    }

    /// Returns the last fetched semantic memories.
    #[inline]
    pub fn memories(&self) -> &[SemanticMemory] {
        &self.memories
    }

    /// Returns `true` while a turn is in flight.
    ///
    /// The session doesn't queue or reject messages sent during an active
    /// turn, callers should check this first.
    #[inline]
    pub fn is_turn_active(&self) -> bool {
        self.state.is_turn_active()
    }

    /// Sends a message and streams the reply into the conversation.
    ///
    /// Returns the phase the turn ended in. Failures never escape as
    /// errors, they are appended to the assistant message instead. After a
    /// complete turn, the semantic memories are refreshed.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future drops the response
    /// stream and releases the connection. The assistant message then
    /// keeps the content received so far.
    pub async fn send_message(&mut self, text: &str) -> TurnPhase {
        let id = self.state.begin_turn(text);
        self.notify();

        let req =
            TurnRequest::new(text, self.state.chat_id().map(ToOwned::to_owned));
        let phase = self
            .stream_turn(req)
            .instrument(debug_span!("turn", %id))
            .await;

        if phase == TurnPhase::Complete {
            self.refresh_memories().await;
        }
        phase
    }

    /// Fetches the semantic memories again. Returns `false` if the fetch
    /// failed, in which case the previous list is kept.
    pub async fn refresh_memories(&mut self) -> bool {
        match self.client.list_memories().await {
            Ok(memories) => {
                debug!("fetched {} memories", memories.len());
                self.memories = memories;
                true
            }
            Err(err) => {
                warn!("failed to refresh memories: {err}");
                false
            }
        }
    }

    async fn stream_turn(&mut self, req: TurnRequest) -> TurnPhase {
        let mut stream = match self.client.open_turn(req).await {
            Ok(stream) => stream,
            Err(err) => {
                error!("failed to open the turn: {err}");
                return self.dispatch(failure_input(err.as_ref()));
            }
        };

        trace!("start receiving events");
        loop {
            let input = match stream.next_event().await {
                Ok(Some(event)) => TurnInput::Event(event),
                Ok(None) => TurnInput::Finished,
                Err(err) => {
                    error!("got an error: {err}");
                    failure_input(err.as_ref())
                }
            };
            let phase = self.dispatch(input);
            if phase.is_terminal() {
                trace!("finished the turn: {phase:?}");
                return phase;
            }
        }
    }

    fn dispatch(&mut self, input: TurnInput) -> TurnPhase {
        let phase = self.state.apply(input);
        self.notify();
        // `send_message` always starts a turn before dispatching.
        phase.unwrap_or(TurnPhase::Failed)
    }

    #[inline]
    fn notify(&mut self) {
        if let Some(on_update) = &mut self.on_update {
            on_update(&self.state);
        }
    }
}

fn failure_input(err: &dyn ChatServiceError) -> TurnInput {
    match err.kind() {
        ErrorKind::HttpStatus | ErrorKind::Request => {
            TurnInput::Rejected(err.to_string())
        }
        ErrorKind::Transport | ErrorKind::Decode => {
            TurnInput::TransportFailed(err.to_string())
        }
    }
}
