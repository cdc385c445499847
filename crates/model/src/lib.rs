//! Shared vocabulary between chat backends and the streaming consumer.
//!
//! This crate describes what a conversation looks like (messages, roles,
//! statuses), what a backend delivers while a turn is streaming (events),
//! and the traits a backend implements to open a turn.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. The state machine
//! that applies events to a conversation lives in `memochat-core`, and
//! the HTTP implementation of the backend lives in `memochat-http`.

#![deny(missing_docs)]

mod error;
mod event;
mod memory;
mod message;
mod request;
mod service;
mod stream;

pub use error::*;
pub use event::*;
pub use memory::*;
pub use message::*;
pub use request::*;
pub use service::*;
pub use stream::*;
