//! Core logic of the search-grounded chat: fetching web context, composing
//! the instruction, streaming the answer and keeping the conversation.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod context;
pub mod conversation;
mod prompt;
mod session;
mod streamer;

pub use context::{ContextFetcher, FALLBACK_CONTEXT, MAX_RESULTS};
pub use conversation::{Conversation, Role, Turn};
pub use prompt::compose;
pub use session::{Session, SessionBuilder, TurnObserver, TurnOutcome};
pub use streamer::{AnswerStream, ResponseStreamer, StreamError};
