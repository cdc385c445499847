//! A terminal client for a conversational service with semantic memory.
//!
//! The binary streams replies into the terminal as they arrive. This library
//! part holds what the binary needs besides rendering: settings, the
//! identity file and the conversion of stored conversations.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod command;
mod history;
mod identity;
mod settings;

pub use command::Command;
pub use history::conversation_from_detail;
pub use identity::FileIdentityStore;
pub use settings::Settings;
