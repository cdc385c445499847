//! A local fake chat service for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use memochat_model::{
    ChatService, ChatServiceError, ErrorKind, Event, EventStream,
    SemanticMemory, TurnRequest,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<u16>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
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

#[derive(Default)]
struct Stats {
    requests: Mutex<Vec<TurnRequest>>,
    memory_fetches: AtomicUsize,
    live_streams: AtomicUsize,
}

pub struct TestEventStream {
    events: VecDeque<Event>,
    ending: Option<PresetEnding>,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
    stats: Arc<Stats>,
}

impl EventStream for TestEventStream {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Event>, Self::Error>> {
        let this = self.get_mut();

        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            if let Some(event) = this.events.pop_front() {
                return Poll::Ready(Ok(Some(event)));
            }
            return match this.ending.take() {
                Some(PresetEnding::TransportFailure(reason)) => {
                    Poll::Ready(Err(Error {
                        message: reason,
                        kind: ErrorKind::Transport,
                        status: None,
                    }))
                }
                // In case this method is called after completion.
                Some(PresetEnding::Finish) | None => Poll::Ready(Ok(None)),
            };
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

impl Drop for TestEventStream {
    fn drop(&mut self) {
        self.stats.live_streams.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A local fake chat service for testing purpose.
///
/// Before opening turns, you need to setup the script, which is how the
/// service should respond to each turn. Turns are consumed in order, one
/// per request. If there are no enough turns in the script, the request is
/// rejected with status 500.
///
/// Clones share the script and the counters, so a test can keep a handle
/// after moving the service into a session.
#[derive(Clone, Default)]
pub struct TestChatService {
    script: Arc<Mutex<VecDeque<PresetTurn>>>,
    memories: Arc<Mutex<Option<Vec<SemanticMemory>>>>,
    stats: Arc<Stats>,
    delay: Option<Duration>,
}

impl TestChatService {
    #[inline]
    pub fn add_turn(&self, turn: PresetTurn) {
        lock(&self.script).push_back(turn);
    }

    /// Sets the memories returned by `list_memories`. Until this is
    /// called, listing memories fails.
    #[inline]
    pub fn set_memories(&self, memories: Vec<SemanticMemory>) {
        *lock(&self.memories) = Some(memories);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<TurnRequest> {
        lock(&self.stats.requests).clone()
    }

    /// Returns how many times the memories were listed.
    #[inline]
    pub fn memory_fetches(&self) -> usize {
        self.stats.memory_fetches.load(Ordering::SeqCst)
    }

    /// Returns the number of opened streams that are not dropped yet.
    #[inline]
    pub fn live_streams(&self) -> usize {
        self.stats.live_streams.load(Ordering::SeqCst)
    }
}

impl ChatService for TestChatService {
    type Error = crate::Error;
    type Stream = TestEventStream;

    fn open_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        lock(&self.stats.requests).push(req.clone());

        let Some(turn) = lock(&self.script).pop_front() else {
            return ready(Err(Error {
                message: "no enough turns".to_owned(),
                kind: ErrorKind::HttpStatus,
                status: Some(500),
            }));
        };
        if let Some(rejection) = turn.rejection {
            return ready(Err(Error {
                message: rejection.message,
                kind: ErrorKind::HttpStatus,
                status: Some(rejection.status),
            }));
        }

        self.stats.live_streams.fetch_add(1, Ordering::SeqCst);
        ready(Ok(TestEventStream {
            events: turn.events.iter().map(PresetEvent::to_event).collect(),
            ending: Some(turn.ending),
            delay: self.delay.unwrap_or(Duration::from_millis(1)),
            sleep: None,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn list_memories(
        &self,
    ) -> impl Future<Output = Result<Vec<SemanticMemory>, Self::Error>>
    + Send
    + 'static {
        self.stats.memory_fetches.fetch_add(1, Ordering::SeqCst);
        let result = match &*lock(&self.memories) {
            Some(memories) => Ok(memories.clone()),
            None => Err(Error {
                message: "memories are unavailable".to_owned(),
                kind: ErrorKind::Transport,
                status: None,
            }),
        };
        ready(result)
    }
}

#[inline]
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
