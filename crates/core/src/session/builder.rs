use scout_model::ModelProvider;
use scout_search::{DuckDuckGoProvider, SearchProvider};

use super::Session;
use crate::context::ContextFetcher;
use crate::streamer::ResponseStreamer;

/// [`Session`] builder.
pub struct SessionBuilder {
    streamer: ResponseStreamer,
    context_fetcher: Option<ContextFetcher>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            streamer: ResponseStreamer::new(provider),
            context_fetcher: None,
        }
    }

    /// Sets the search provider. DuckDuckGo is used if none is set.
    #[inline]
    pub fn with_search_provider<P: SearchProvider + 'static>(
        mut self,
        provider: P,
    ) -> Self {
        self.context_fetcher = Some(ContextFetcher::new(provider));
        self
    }

    /// Builds a session with an empty conversation.
    #[inline]
    pub fn build(self) -> Session {
        let context_fetcher = self
            .context_fetcher
            .unwrap_or_else(|| ContextFetcher::new(DuckDuckGoProvider::new()));
        Session {
            context_fetcher,
            streamer: self.streamer,
            conversation: Default::default(),
        }
    }
}
