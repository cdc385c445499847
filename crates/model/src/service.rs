use std::error::Error;

use crate::error::ErrorKind;
use crate::memory::SemanticMemory;
use crate::request::TurnRequest;
use crate::stream::EventStream;

/// The error type for a chat service.
pub trait ChatServiceError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns the status code if the server rejected the request.
    fn status(&self) -> Option<u16> {
        None
    }
}

/// A type that represents a remote conversational service, the entry for
/// opening streamed turns and reading what the service remembers about the
/// user.
///
/// Once the service is created, it should behave like a stateless object.
/// Callers should not rely on internal state, and the service should be
/// prepared for being dropped anytime.
pub trait ChatService: Send + Sync {
    /// The error type that may be returned by the service.
    type Error: ChatServiceError;

    /// The stream type of an opened turn.
    type Stream: EventStream<Error = Self::Error>;

    /// Opens a turn.
    ///
    /// The future resolves once the server accepted the request and the
    /// response is ready to stream. A server rejection resolves to an
    /// error of kind [`ErrorKind::HttpStatus`], and no stream is created.
    fn open_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static;

    /// Lists the semantic memories of the current user.
    fn list_memories(
        &self,
    ) -> impl Future<Output = Result<Vec<SemanticMemory>, Self::Error>>
    + Send
    + 'static;
}
