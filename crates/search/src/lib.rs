//! Web search providers.
//!
//! A search provider turns a free-text query into an ordered list of short
//! result snippets. The order is whatever the provider considers most
//! relevant, consumers should not re-rank it.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod duckduckgo;
mod error;
mod provider;

pub use duckduckgo::DuckDuckGoProvider;
pub use error::*;
pub use provider::*;
