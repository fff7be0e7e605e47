//! An abstraction layer for chat-completion models.
//!
//! This crate establishes a small protocol between the chat session and
//! the hosted model it streams answers from, so that the session can be
//! driven by a real provider or by a scripted fake without modifying the
//! orchestration code.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
