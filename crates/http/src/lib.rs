//! A chat service that talks to the conversational backend over HTTP.
//!
//! Turns are streamed as server-sent events from `POST /chat/stream`; the
//! other endpoints (conversations, memories, single-shot chat) are plain
//! JSON.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod status;
mod stream;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use memochat_model::{
    ChatService, ChatServiceError, ConversationSummary, ErrorKind,
    SemanticMemory, TurnRequest,
};
use mime::Mime;
use reqwest::{Client, Method, RequestBuilder, header};
use serde::de::DeserializeOwned;

pub use config::{ChatConfig, ChatConfigBuilder};
use io::{Chunks, EventReader};
pub use proto::{ChatReply, ConversationDetail, HistoryMessage};
use proto::{DeleteResponse, MemoriesResponse};
use status::check_status;
pub use stream::HttpEventStream;

/// The header carrying the caller identity.
pub const IDENTITY_HEADER: &str = "X-User-ID";

/// Error type for [`HttpChatService`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<u16>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            status: None,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            let message = format!("invalid request: {err}");
            return Self::new(message, ErrorKind::Request);
        }
        Self::new(format!("{err}"), ErrorKind::Transport)
    }

    #[inline]
    fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ChatServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn status(&self) -> Option<u16> {
        self.status
    }
}

/// HTTP chat service.
#[derive(Clone, Debug)]
pub struct HttpChatService {
    client: Client,
    config: Arc<ChatConfig>,
}

impl HttpChatService {
    /// Creates a new `HttpChatService` with the given configuration.
    #[inline]
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Lists the conversations of the current user, most recent first.
    pub async fn list_conversations(
        &self,
    ) -> Result<Vec<ConversationSummary>, Error> {
        fetch_json(self.request(Method::GET, "/chats")).await
    }

    /// Creates an empty conversation.
    pub async fn create_conversation(
        &self,
    ) -> Result<ConversationSummary, Error> {
        fetch_json(self.request(Method::POST, "/chats/new")).await
    }

    /// Loads a conversation with its messages.
    pub async fn get_conversation(
        &self,
        chat_id: &str,
    ) -> Result<ConversationDetail, Error> {
        fetch_json(self.request(Method::GET, &format!("/chats/{chat_id}")))
            .await
    }

    /// Deletes a conversation and returns the id the server deleted.
    pub async fn delete_conversation(
        &self,
        chat_id: &str,
    ) -> Result<String, Error> {
        let resp: DeleteResponse = fetch_json(
            self.request(Method::DELETE, &format!("/chats/{chat_id}")),
        )
        .await?;
        Ok(resp.chat_id)
    }

    /// Sends a message to the single-shot endpoint and waits for the whole
    /// reply.
    pub async fn send_message(
        &self,
        req: &TurnRequest,
    ) -> Result<ChatReply, Error> {
        fetch_json(self.request(Method::POST, "/chat").json(req)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.config.url(path))
            .header(IDENTITY_HEADER, &self.config.identity);
        for (name, value) in &self.config.headers {
            builder = builder.header(name, value);
        }
        builder
    }
}

impl ChatService for HttpChatService {
    type Error = Error;
    type Stream = HttpEventStream;

    fn open_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .request(Method::POST, &self.config.stream_path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(req)
            .send();

        async move {
            let resp = resp_fut.await.map_err(Error::transport)?;
            let resp = check_status(resp).await?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype().as_str() == "event-stream")
                .unwrap_or(false);
            if !is_event_stream {
                warn!(
                    "unexpected content type {content_type:?}, reading it as an event stream anyway"
                );
            }

            // Here we got a successful response.
            let chunks = Chunks::from_response(resp);
            Ok(HttpEventStream::from_reader(EventReader::new(chunks)))
        }
    }

    fn list_memories(
        &self,
    ) -> impl Future<Output = Result<Vec<SemanticMemory>, Self::Error>>
    + Send
    + 'static {
        let builder = self.request(Method::GET, "/memories");
        async move {
            let resp: MemoriesResponse = fetch_json(builder).await?;
            Ok(resp.memories)
        }
    }
}

async fn fetch_json<T: DeserializeOwned>(
    builder: RequestBuilder,
) -> Result<T, Error> {
    let resp = builder.send().await.map_err(Error::transport)?;
    let resp = check_status(resp).await?;
    let body = resp.bytes().await.map_err(Error::transport)?;
    serde_json::from_slice(&body)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Decode))
}
