//! Core logic of the chat client: the turn state machine, conversation
//! state, the session that streams turns, and identity resolution.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod client;
pub mod conversation;
pub mod identity;
mod session;
mod turn;

pub use conversation::ConversationState;
pub use session::{Session, SessionBuilder};
pub use turn::{TurnInput, TurnPhase, reduce};
