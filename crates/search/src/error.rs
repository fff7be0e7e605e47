use std::error::Error as StdError;
use std::fmt::{self, Display};

/// The kind of error that occurred while searching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The provider could not be reached.
    Network,
    /// The provider answered, but refused or failed the query.
    Provider,
    /// The provider's answer could not be understood.
    Parse,
    /// The query matched nothing.
    NoResults,
}

/// The error type for a search provider.
pub trait SearchProviderError: StdError + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A general-purpose [`SearchProviderError`] carrying a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchError {
    message: String,
    kind: ErrorKind,
}

impl SearchError {
    /// Creates a new error.
    #[inline]
    pub fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for SearchError {}

impl SearchProviderError for SearchError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}
