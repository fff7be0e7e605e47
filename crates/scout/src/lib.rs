//! A terminal chat that answers questions with a hosted model, grounded
//! on a fresh web search for every question.
//!
//! The crate includes a CLI tool for using in the terminal. The pieces it
//! is built from (configuration, input and rendering) are exposed so they can be
//! reused by other front ends.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod config;
pub mod input;
pub mod render;

pub use config::{API_KEY_VAR, BASE_URL_VAR, Config, SetupError};

/// Re-exports of [`scout_core`] crate.
pub mod core {
    pub use scout_core::*;
}
