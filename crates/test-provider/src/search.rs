use std::future::ready;
use std::sync::{Arc, Mutex};

use scout_search::{ErrorKind, SearchError, SearchProvider, SearchResult};

/// A recorded call to [`TestSearchProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub max_results: usize,
}

#[derive(Clone, Debug)]
enum Outcome {
    Results(Vec<SearchResult>),
    Failure(ErrorKind, String),
}

/// A local fake search provider for testing purpose.
///
/// It answers every query with the same outcome. Unlike a real provider,
/// it ignores `max_results` and returns every configured result, which lets
/// tests check that callers bound the result count themselves.
#[derive(Clone, Debug)]
pub struct TestSearchProvider {
    outcome: Outcome,
    calls: Arc<Mutex<Vec<SearchCall>>>,
}

impl TestSearchProvider {
    /// Answers with the given results.
    #[inline]
    pub fn with_results(results: impl Into<Vec<SearchResult>>) -> Self {
        Self {
            outcome: Outcome::Results(results.into()),
            calls: Default::default(),
        }
    }

    /// Answers with results whose bodies are the given strings.
    pub fn with_bodies<I, S>(bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let results: Vec<_> = bodies
            .into_iter()
            .enumerate()
            .map(|(idx, body)| SearchResult {
                title: format!("Result {}", idx + 1),
                url: format!("https://example.com/{}", idx + 1),
                body: body.into(),
            })
            .collect();
        Self::with_results(results)
    }

    /// Fails every query with the given kind.
    #[inline]
    pub fn failing<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            outcome: Outcome::Failure(kind, message.into()),
            calls: Default::default(),
        }
    }

    /// Returns every call received so far.
    #[inline]
    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

impl SearchProvider for TestSearchProvider {
    type Error = SearchError;

    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>, Self::Error>> + Send + 'static
    {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(SearchCall {
                query: query.to_owned(),
                max_results,
            });
        let result = match &self.outcome {
            Outcome::Results(results) => Ok(results.clone()),
            Outcome::Failure(kind, message) => {
                Err(SearchError::new(message.clone(), *kind))
            }
        };
        ready(result)
    }
}
