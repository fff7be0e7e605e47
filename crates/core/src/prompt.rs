/// Builds the instruction sent to the model: the context block first, then
/// the user's query, both verbatim.
///
/// Nothing is validated or truncated here. Size limits are the
/// provider's business.
#[inline]
pub fn compose(context: &str, query: &str) -> String {
    format!("Using this web data: {context}\n\nAnswer the user query: {query}")
}
