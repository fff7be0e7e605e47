use std::pin::Pin;
use std::sync::Arc;

use scout_search::{SearchProvider, SearchProviderError, SearchResult};
use tracing::Instrument;

/// The context used in place of search results when searching fails.
pub const FALLBACK_CONTEXT: &str =
    "Search currently unavailable. Responding with internal knowledge.";

/// How many results are requested from the provider and kept.
pub const MAX_RESULTS: usize = 3;

type SearchOutcome = Result<Vec<SearchResult>, Box<dyn SearchProviderError>>;
type BoxedSearchFuture = Pin<Box<dyn Future<Output = SearchOutcome> + Send>>;
type HandlerFn = Arc<dyn Fn(&str) -> BoxedSearchFuture + Send + Sync>;

/// Fetches grounding text for a query from a search provider.
///
/// The fetcher never fails: any search error is logged and replaced by
/// [`FALLBACK_CONTEXT`].
#[derive(Clone)]
pub struct ContextFetcher {
    handler_fn: HandlerFn,
}

impl ContextFetcher {
    /// Creates a fetcher querying `provider`.
    #[inline]
    pub fn new<P: SearchProvider + 'static>(provider: P) -> Self {
        let handler_fn: HandlerFn = Arc::new(move |query: &str| {
            let fut = provider.search(query, MAX_RESULTS);
            Box::pin(async move {
                fut.await
                    .map_err(|err| Box::new(err) as Box<dyn SearchProviderError>)
            })
        });
        Self { handler_fn }
    }

    /// Returns the bodies of at most [`MAX_RESULTS`] results joined by
    /// newlines, in provider order, or the fallback text.
    pub async fn fetch_context(&self, query: &str) -> String {
        let results = (self.handler_fn)(query)
            .instrument(debug_span!("web search"))
            .await;
        match results {
            Ok(results) if !results.is_empty() => {
                debug!("got {} search result(s)", results.len());
                results
                    .into_iter()
                    .take(MAX_RESULTS)
                    .map(|result| result.body)
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Ok(_) => {
                warn!("search returned no results, using fallback context");
                FALLBACK_CONTEXT.to_owned()
            }
            Err(err) => {
                warn!(kind = ?err.kind(), "search failed: {err}");
                FALLBACK_CONTEXT.to_owned()
            }
        }
    }
}
