//! Byte-level plumbing of the response stream: chunks in, events out.

mod chunks;
mod decoder;
mod frame;
mod reader;

pub use chunks::{Chunks, Error as ChunksError};
pub use decoder::FrameBuffer;
pub use frame::parse_frame;
pub use reader::EventReader;
