/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credential was rejected by the provider.
    Unauthorized,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The response stream was malformed or ended abnormally.
    Protocol,
    /// Any other errors.
    Other,
}
