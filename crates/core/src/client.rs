use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use memochat_model::{
    ChatService, ChatServiceError, Event, EventStream, SemanticMemory,
    TurnRequest,
};

type BoxedError = Box<dyn ChatServiceError>;
type BoxedFuture<T> = Pin<Box<dyn Future<Output = Result<T, BoxedError>> + Send>>;

/// A wrapper around a chat service that provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ChatClient {
    service: Arc<dyn ServiceObject>,
}

impl ChatClient {
    #[inline]
    pub fn new<S: ChatService + 'static>(service: S) -> Self {
        // We have to erase the type `S`, since `ChatClient` doesn't have a
        // generic parameter and we don't want it either.
        Self {
            service: Arc::new(AnyService(service)),
        }
    }

    /// Opens a turn.
    #[inline]
    pub async fn open_turn(
        &self,
        req: TurnRequest,
    ) -> Result<TurnStream, BoxedError> {
        trace!("opening a turn: {req:?}");
        self.service.open_turn(&req).await
    }

    /// Lists the semantic memories of the current user.
    #[inline]
    pub async fn list_memories(&self) -> Result<Vec<SemanticMemory>, BoxedError> {
        self.service.list_memories().await
    }
}

/// The events of an opened turn.
///
/// The underlying stream, and any connection it holds, is released when
/// this value is dropped.
pub struct TurnStream {
    inner: Pin<Box<dyn StreamObject>>,
}

impl TurnStream {
    /// Waits for the next event. `Ok(None)` means the stream has ended.
    #[inline]
    pub async fn next_event(&mut self) -> Result<Option<Event>, BoxedError> {
        poll_fn(|cx| self.inner.as_mut().poll_next_event(cx)).await
    }
}

trait ServiceObject: Send + Sync + 'static {
    fn open_turn(&self, req: &TurnRequest) -> BoxedFuture<TurnStream>;

    fn list_memories(&self) -> BoxedFuture<Vec<SemanticMemory>>;
}

struct AnyService<S: ChatService>(S);

impl<S: ChatService + 'static> ServiceObject for AnyService<S> {
    fn open_turn(&self, req: &TurnRequest) -> BoxedFuture<TurnStream> {
        let fut = self.0.open_turn(req);
        Box::pin(async move {
            match fut.await {
                Ok(stream) => Ok(TurnStream {
                    inner: Box::pin(stream),
                }),
                Err(err) => Err(Box::new(err) as BoxedError),
            }
        })
    }

    fn list_memories(&self) -> BoxedFuture<Vec<SemanticMemory>> {
        let fut = self.0.list_memories();
        Box::pin(async move {
            fut.await.map_err(|err| Box::new(err) as BoxedError)
        })
    }
}

trait StreamObject: Send {
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Event>, BoxedError>>;
}

impl<T: EventStream> StreamObject for T {
    #[inline]
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Event>, BoxedError>> {
        EventStream::poll_next_event(self, cx)
            .map_err(|err| Box::new(err) as BoxedError)
    }
}
