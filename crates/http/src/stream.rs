use std::pin::Pin;
use std::task::{Context, Poll, ready};

use memochat_model::{ErrorKind, Event, EventStream};
use pin_project_lite::pin_project;

use crate::Error;
use crate::io::EventReader;

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = (Result<Option<Event>, Error>, EventReader);

pin_project! {
    /// The event stream of a turn opened over HTTP.
    ///
    /// Dropping the stream drops the underlying response and releases the
    /// connection, whatever state the turn is in.
    pub struct HttpEventStream {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl HttpEventStream {
    #[inline]
    pub(crate) fn from_reader(reader: EventReader) -> Self {
        Self {
            next_event_fut: Some(Box::pin(next_event(reader))),
        }
    }
}

impl EventStream for HttpEventStream {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Event>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            // The stream has ended or failed before.
            return Poll::Ready(Ok(None));
        };
        let (result, reader) = ready!(next_event_fut.as_mut().poll(cx));
        match result {
            Ok(Some(event)) => {
                // The body may still have more data to pull, create a new
                // future for the next event.
                *this.next_event_fut = Some(Box::pin(next_event(reader)));
                Poll::Ready(Ok(Some(event)))
            }
            Ok(None) => {
                *this.next_event_fut = None;
                Poll::Ready(Ok(None))
            }
            Err(err) => {
                *this.next_event_fut = None;
                Poll::Ready(Err(err))
            }
        }
    }
}

async fn next_event(mut reader: EventReader) -> NextEvent {
    let result = match reader.next_event().await {
        Ok(event) => {
            if let Some(event) = &event {
                trace!("got sse event: {event:?}");
            }
            Ok(event)
        }
        Err(err) => {
            error!("stream interrupted: {err}");
            Err(Error::new(format!("{err}"), ErrorKind::Transport))
        }
    };
    (result, reader)
}
