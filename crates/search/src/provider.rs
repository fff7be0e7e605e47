use crate::error::SearchProviderError;

/// One hit returned by a search provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Title of the page.
    pub title: String,
    /// Address of the page.
    pub url: String,
    /// The textual body (snippet) of the hit.
    pub body: String,
}

/// A type that can fetch text snippets for a query.
///
/// Like model providers, search providers should behave like stateless
/// objects: no caching and no retries, each call goes out to the provider.
pub trait SearchProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: SearchProviderError;

    /// Searches for `query`, asking for at most `max_results` hits.
    ///
    /// Providers are not required to honor the limit exactly, callers
    /// that need a hard bound must truncate themselves.
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>, Self::Error>> + Send + 'static;
}
