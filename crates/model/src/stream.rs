use std::pin::Pin;
use std::task::{self, Poll};

use crate::event::Event;
use crate::service::ChatServiceError;

/// The events of one opened turn, in the order the server sent them.
pub trait EventStream: Sized + Send + 'static {
    /// The error type that may be returned while reading.
    type Error: ChatServiceError;

    /// Attempts to pull out the next event from the stream.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct stream state:
    ///
    /// - `Poll::Pending` means that this stream is still waiting for
    ///   the next event. Implementations will ensure that the current
    ///   task will be notified when the next event may be ready.
    /// - `Poll::Ready(Ok(Some(event)))` means the stream has an event
    ///   to deliver, and may produce further events on subsequent
    ///   `poll_next_event` calls.
    /// - `Poll::Ready(Ok(None))` means the server finished the stream.
    /// - `Poll::Ready(Err(error))` means the transport failed. This is
    ///   never reported as a normal end of stream.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<Event>, Self::Error>>;
}
