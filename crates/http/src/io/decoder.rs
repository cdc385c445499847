use std::borrow::Cow;
use std::mem;

const DELIMITER: &[u8] = b"\n\n";

/// Incremental UTF-8 decoder and frame splitter.
///
/// Bytes are pushed chunk by chunk. A multi-byte character cut by a chunk
/// boundary is held back until the rest of it arrives, and text is held in
/// the buffer until a blank line completes the frame.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    // Leading bytes of a character whose remaining bytes are not here yet.
    partial_char: Vec<u8>,
    text: String,
    // Offset in `text` below which no delimiter can start.
    scanned: usize,
}

impl FrameBuffer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a chunk and appends it to the buffer.
    ///
    /// Invalid sequences decode to U+FFFD, they never fail the stream.
    pub fn push(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        let input: Cow<'_, [u8]> = if self.partial_char.is_empty() {
            Cow::Borrowed(chunk)
        } else {
            let mut joined = mem::take(&mut self.partial_char);
            joined.extend_from_slice(chunk);
            Cow::Owned(joined)
        };

        let mut rest = &input[..];
        loop {
            match str::from_utf8(rest) {
                Ok(s) => {
                    self.text.push_str(s);
                    break;
                }
                Err(err) => {
                    let (valid, invalid) = rest.split_at(err.valid_up_to());
                    self.text.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            rest = &invalid[len..];
                        }
                        None => {
                            // The input ends in the middle of a character.
                            self.partial_char = invalid.to_vec();
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Takes the next complete frame out of the buffer, without its
    /// delimiter.
    pub fn next_frame(&mut self) -> Option<String> {
        let bytes = self.text.as_bytes();
        let Some(pos) = bytes[self.scanned..]
            .windows(DELIMITER.len())
            .position(|w| w == DELIMITER)
        else {
            // A delimiter may still start at the last byte.
            self.scanned = bytes.len().saturating_sub(DELIMITER.len() - 1);
            return None;
        };

        let end = self.scanned + pos;
        let frame = self.text[..end].to_owned();
        self.text.drain(..end + DELIMITER.len());
        self.scanned = 0;
        Some(frame)
    }

    /// Ends decoding. Whatever is still buffered is a torn trailing frame,
    /// which is returned and not delivered as an event.
    pub fn finish(&mut self) -> Option<String> {
        let dangling_bytes = mem::take(&mut self.partial_char);
        let text = mem::take(&mut self.text);
        self.scanned = 0;

        if text.is_empty() && dangling_bytes.is_empty() {
            return None;
        }
        debug!(
            "dropping an incomplete trailing frame ({} bytes)",
            text.len() + dangling_bytes.len()
        );
        Some(text)
    }
}
