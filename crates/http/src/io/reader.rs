use memochat_model::Event;

use super::{Chunks, ChunksError, FrameBuffer, parse_frame};

/// A type for reading server-sent events from a chunk stream.
pub struct EventReader {
    chunks: Chunks,
    buffer: FrameBuffer,
    exhausted: bool,
}

impl EventReader {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            chunks,
            buffer: FrameBuffer::new(),
            exhausted: false,
        }
    }

    /// Reads the next event.
    ///
    /// Returns `Ok(None)` once the body has ended and every complete frame
    /// has been delivered. A transport failure is returned as an error,
    /// even if it happens right at the end of the body.
    pub async fn next_event(&mut self) -> Result<Option<Event>, ChunksError> {
        loop {
            // Deliver what is already buffered before reading more.
            while let Some(frame) = self.buffer.next_frame() {
                if let Some(event) = parse_frame(&frame) {
                    return Ok(Some(event));
                }
                trace!("skipped a frame without fields");
            }

            if self.exhausted {
                return Ok(None);
            }

            match self.chunks.next_chunk().await? {
                Some(bytes) => self.buffer.push(&bytes),
                None => {
                    self.exhausted = true;
                    self.buffer.finish();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use bytes::Bytes;
    use serde_json::json;

    use super::*;

    fn reader_from(chunks: &[&'static [u8]]) -> EventReader {
        let chunks: VecDeque<Bytes> =
            chunks.iter().copied().map(Bytes::from_static).collect();
        EventReader::new(Chunks::from_vec_deque(chunks))
    }

    async fn collect_events(reader: &mut EventReader) -> Vec<Event> {
        let mut events = vec![];
        while let Some(event) = reader.next_event().await.unwrap() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_normal_events() {
        let mut reader = reader_from(&[
            b"event: token\ndata: {\"text\":\"hello\"}\n\n",
            b"event: token\ndata: {\"text\":\"bye\"}\n\n",
        ]);
        let events = collect_events(&mut reader).await;
        assert_eq!(
            events,
            vec![
                Event::new("token", json!({ "text": "hello" })),
                Event::new("token", json!({ "text": "bye" })),
            ]
        );
        assert_eq!(reader.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quirk_streaming() {
        let mut reader = reader_from(&[
            b"event: tok",
            b"en\ndata:",
            b"",
            b" {\"text\":\"hello\"}\n",
            b"\nevent: done\n\n",
        ]);
        let events = collect_events(&mut reader).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].str_field("text"), Some("hello"));
        assert_eq!(events[1].name, "done");
    }

    #[tokio::test]
    async fn test_skips_empty_frames() {
        let mut reader =
            reader_from(&[b": ping\n\n\n\ndata: {\"text\":\"x\"}\n\n"]);
        let events = collect_events(&mut reader).await;
        assert_eq!(events, vec![Event::new("message", json!({ "text": "x" }))]);
    }

    #[tokio::test]
    async fn test_torn_trailing_frame() {
        let mut reader = reader_from(&[
            b"event: token\ndata: {\"text\":\"a\"}\n\n",
            b"event: token\ndata: {\"text\":\"b\"}\n",
        ]);
        let events = collect_events(&mut reader).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].str_field("text"), Some("a"));
    }

    #[tokio::test]
    async fn test_chunking_invariance() {
        const BODY: &[u8] = "event: start\r\ndata: {\"chat_id\":\"c1\"}\r\n\n\
            event: token\ndata: {\"text\":\"Grüße, \"}\n\n\
            event: token\ndata:{\"text\":\"wie geht's? 👋\"}\n\n\
            data: plain text\n\n\
            event: done\n\n"
            .as_bytes();

        async fn events_of(chunks: Vec<&[u8]>) -> Vec<Event> {
            let chunks: VecDeque<Bytes> =
                chunks.into_iter().map(Bytes::copy_from_slice).collect();
            let mut reader = EventReader::new(Chunks::from_vec_deque(chunks));
            collect_events(&mut reader).await
        }

        let expected = events_of(vec![BODY]).await;
        assert_eq!(expected.len(), 5);
        assert_eq!(expected[0].str_field("chat_id"), Some("c1"));
        assert_eq!(expected[2].str_field("text"), Some("wie geht's? 👋"));
        assert_eq!(expected[3].str_field("text"), Some("plain text"));

        for at in 0..=BODY.len() {
            let (head, tail) = BODY.split_at(at);
            assert_eq!(events_of(vec![head, tail]).await, expected, "at {at}");
        }
        for size in 1..=7 {
            let chunks = BODY.chunks(size).collect();
            assert_eq!(events_of(chunks).await, expected, "size {size}");
        }
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let chunks = Chunks::from_results(
            vec![
                Ok(Bytes::from_static(b"event: token\ndata: {\"text\":\"a\"}\n\n")),
                Err(ChunksError("connection reset".to_owned())),
            ]
            .into(),
        );
        let mut reader = EventReader::new(chunks);
        let first = reader.next_event().await.unwrap().unwrap();
        assert_eq!(first.str_field("text"), Some("a"));
        assert_eq!(
            reader.next_event().await.unwrap_err(),
            ChunksError("connection reset".to_owned())
        );
    }
}
