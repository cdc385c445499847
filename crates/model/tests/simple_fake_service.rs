use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::{poll_fn, ready};
use std::pin::Pin;
use std::task::{self, Poll};

use memochat_model::{
    ChatService, ChatServiceError, ErrorKind, Event, EventStream,
    SemanticMemory, TurnRequest,
};
use serde_json::json;

#[derive(Debug)]
struct ScriptError {
    kind: ErrorKind,
    message: &'static str,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl Error for ScriptError {}

impl ChatServiceError for ScriptError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn status(&self) -> Option<u16> {
        (self.kind == ErrorKind::HttpStatus).then_some(422)
    }
}

/// Yields its events one at a time, returning `Pending` once before each
/// of them so consumers have to honor the waker.
struct ScriptedStream {
    events: VecDeque<Event>,
    broken: bool,
    ready: bool,
}

impl ScriptedStream {
    fn new(events: Vec<Event>, broken: bool) -> Self {
        Self {
            events: events.into(),
            broken,
            ready: false,
        }
    }
}

impl EventStream for ScriptedStream {
    type Error = ScriptError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<Event>, Self::Error>> {
        let this = self.get_mut();
        if !this.ready {
            this.ready = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        this.ready = false;

        if let Some(event) = this.events.pop_front() {
            return Poll::Ready(Ok(Some(event)));
        }
        if std::mem::take(&mut this.broken) {
            return Poll::Ready(Err(ScriptError {
                kind: ErrorKind::Transport,
                message: "connection reset",
            }));
        }
        Poll::Ready(Ok(None))
    }
}

/// Answers by keyword: an empty message is rejected, "crash" breaks the
/// connection, "fail" gets an error event, anything else gets a weather
/// report with a tool call.
struct ScriptedService;

impl ChatService for ScriptedService {
    type Error = ScriptError;
    type Stream = ScriptedStream;

    fn open_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let token = |text: &str| Event::new("token", json!({ "text": text }));
        let start = Event::new(
            "start",
            json!({ "chat_id": req.chat_id.as_deref().unwrap_or("c1") }),
        );

        let result = match req.message.as_str() {
            "" => Err(ScriptError {
                kind: ErrorKind::HttpStatus,
                message: "message must not be empty",
            }),
            "crash" => Ok(ScriptedStream::new(vec![start, token("Hm")], true)),
            "fail" => Ok(ScriptedStream::new(
                vec![
                    start,
                    Event::new("error", json!({ "message": "model overloaded" })),
                ],
                false,
            )),
            _ => Ok(ScriptedStream::new(
                vec![
                    start,
                    Event::new(
                        "tool_call",
                        json!({ "tool": "weather", "input": { "city": "Oslo" } }),
                    ),
                    token("Rainy, "),
                    token("as usual."),
                    Event::new("done", json!({})),
                ],
                false,
            )),
        };
        ready(result)
    }

    fn list_memories(
        &self,
    ) -> impl Future<Output = Result<Vec<SemanticMemory>, Self::Error>>
    + Send
    + 'static {
        let memory = serde_json::from_value(json!({
            "key": "home_city",
            "value": "Oslo",
            "type": "fact"
        }))
        .map_err(|_| ScriptError {
            kind: ErrorKind::Decode,
            message: "bad memory",
        });
        ready(memory.map(|memory| vec![memory]))
    }
}

async fn drain(
    stream: ScriptedStream,
) -> (Vec<Event>, Option<ScriptError>, Pin<Box<ScriptedStream>>) {
    let mut stream = Box::pin(stream);
    let mut events = vec![];
    loop {
        match poll_fn(|cx| stream.as_mut().poll_next_event(cx)).await {
            Ok(Some(event)) => events.push(event),
            Ok(None) => return (events, None, stream),
            Err(err) => return (events, Some(err), stream),
        }
    }
}

#[tokio::test]
async fn test_streamed_turn() {
    let stream = ScriptedService
        .open_turn(&TurnRequest::new("Weather in Oslo?", None))
        .await
        .unwrap();
    let (events, err, mut stream) = drain(stream).await;
    assert!(err.is_none());

    let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["start", "tool_call", "token", "token", "done"]);
    assert_eq!(events[0].str_field("chat_id"), Some("c1"));
    assert_eq!(events[1].str_field("tool"), Some("weather"));
    let text: String =
        events.iter().filter_map(|e| e.str_field("text")).collect();
    assert_eq!(text, "Rainy, as usual.");

    // Polling after completion keeps returning `None`.
    for _ in 0..2 {
        let after = poll_fn(|cx| stream.as_mut().poll_next_event(cx)).await;
        assert!(matches!(after, Ok(None)));
    }
}

#[tokio::test]
async fn test_error_event_is_delivered() {
    let req = TurnRequest::new("fail", Some("c7".to_owned()));
    let stream = ScriptedService.open_turn(&req).await.unwrap();
    let (events, err, _) = drain(stream).await;
    assert!(err.is_none());
    assert_eq!(events[0].str_field("chat_id"), Some("c7"));
    assert_eq!(events[1].name, "error");
    assert_eq!(events[1].str_field("message"), Some("model overloaded"));
}

#[tokio::test]
async fn test_transport_failure() {
    let stream = ScriptedService
        .open_turn(&TurnRequest::new("crash", None))
        .await
        .unwrap();
    let (events, err, mut stream) = drain(stream).await;
    assert_eq!(events.len(), 2);
    let err = err.unwrap();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), None);

    let after = poll_fn(|cx| stream.as_mut().poll_next_event(cx)).await;
    assert!(matches!(after, Ok(None)));
}

#[tokio::test]
async fn test_rejected_turn() {
    let req = TurnRequest::new("", None);
    let Err(err) = ScriptedService.open_turn(&req).await else {
        panic!("an empty message should be rejected");
    };
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.to_string(), "message must not be empty");
}

#[tokio::test]
async fn test_list_memories() {
    let memories = ScriptedService.list_memories().await.unwrap();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].key, "home_city");
    assert_eq!(memories[0].kind.as_deref(), Some("fact"));
    assert_eq!(memories[0].confidence, None);
}
