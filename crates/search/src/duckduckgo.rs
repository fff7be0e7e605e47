use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, Url, header};

use crate::error::{ErrorKind, SearchError};
use crate::provider::{SearchProvider, SearchResult};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

// The HTML endpoint rejects requests that don't look like a browser.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:131.0) \
                          Gecko/20100101 Firefox/131.0";

static RESULT_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<(?:a|div)\s+([^>]*?class="result__(a|snippet)"[^>]*)>(.*?)</(?:a|div)>"#,
    )
    .expect("result pattern is valid")
});
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="([^"]*)""#).expect("href pattern is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("space pattern is valid"));

/// Search provider backed by DuckDuckGo's HTML endpoint.
///
/// No API key is needed. Results are scraped from the returned page, sponsored
/// results are skipped.
#[derive(Clone, Debug)]
pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
    region: String,
}

impl DuckDuckGoProvider {
    /// Creates a provider using the public endpoint and no region bias.
    #[inline]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            region: "wt-wt".to_owned(),
        }
    }

    /// Sets a custom endpoint, mostly useful for pointing at a mirror.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the region code (for example `us-en`), `wt-wt` means no region.
    #[inline]
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = region.into();
        self
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchProvider for DuckDuckGoProvider {
    type Error = SearchError;

    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>, Self::Error>> + Send + 'static
    {
        let params = [("q", query), ("b", ""), ("kl", self.region.as_str())];
        let resp_fut = self
            .client
            .post(&self.endpoint)
            .header(header::USER_AGENT, USER_AGENT)
            .form(&params)
            .send();

        async move {
            let resp = resp_fut.await.map_err(|err| {
                SearchError::new(format!("{err}"), ErrorKind::Network)
            })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(SearchError::new(
                    format!("search returned HTTP {status}"),
                    ErrorKind::Provider,
                ));
            }
            let page = resp.text().await.map_err(|err| {
                SearchError::new(format!("{err}"), ErrorKind::Network)
            })?;

            let mut results = parse_results(&page)?;
            results.truncate(max_results);
            debug!("search returned {} result(s)", results.len());
            Ok(results)
        }
    }
}

/// Extracts organic results from a DuckDuckGo HTML page, in page order.
fn parse_results(page: &str) -> Result<Vec<SearchResult>, SearchError> {
    let mut results = vec![];
    let mut current: Option<SearchResult> = None;
    let mut skipping_ad = false;

    for caps in RESULT_PART.captures_iter(page) {
        let attrs = &caps[1];
        let inner = &caps[3];
        match &caps[2] {
            "a" => {
                results.extend(current.take());
                let href = HREF
                    .captures(attrs)
                    .map(|c| decode_entities(&c[1]))
                    .unwrap_or_default();
                // Sponsored links are routed through `y.js`.
                skipping_ad = href.contains("duckduckgo.com/y.js");
                if skipping_ad {
                    continue;
                }
                current = Some(SearchResult {
                    title: html_to_text(inner),
                    url: resolve_redirect(&href),
                    body: String::new(),
                });
            }
            _ => {
                if skipping_ad {
                    continue;
                }
                if let Some(result) = &mut current {
                    result.body = html_to_text(inner);
                }
            }
        }
    }
    results.extend(current);

    if results.is_empty() {
        if page.contains("class=\"no-results\"") {
            return Err(SearchError::new(
                "no results found",
                ErrorKind::NoResults,
            ));
        }
        return Err(SearchError::new(
            "unrecognized search page",
            ErrorKind::Parse,
        ));
    }
    Ok(results)
}

/// Result links point at a redirector carrying the target in `uddg`.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_owned()
    };
    let Ok(url) = Url::parse(&absolute) else {
        return href.to_owned();
    };
    url.query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, target)| target.into_owned())
        .unwrap_or(absolute)
}

fn html_to_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, "");
    let decoded = decode_entities(&stripped);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = name.strip_prefix('#')?;
            let code = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchProviderError;

    #[test]
    fn test_parse_results() {
        let page = include_str!("../fixtures/duckduckgo.html");
        let results = parse_results(page).unwrap();
        assert_eq!(results.len(), 4);

        assert_eq!(results[0].title, "Paris - Wikipedia");
        assert_eq!(results[0].url, "https://en.wikipedia.org/wiki/Paris");
        assert_eq!(
            results[0].body,
            "Paris is the capital and largest city of France. \
             With an estimated population of 2,102,650 residents."
        );
        assert_eq!(
            results[1].body,
            "The capital of France is Paris, known for the Eiffel Tower & the Louvre."
        );
        assert_eq!(results[2].title, "France's \"City of Light\"");
        assert_eq!(results[3].body, "");
        assert!(results.iter().all(|r| !r.body.contains("Sponsored")));
    }

    #[test]
    fn test_no_results_page() {
        let page = r#"<div class="no-results">No results.</div>"#;
        let err = parse_results(page).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoResults);

        let err = parse_results("<html>anomaly</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#39;x&#x27;"), "'x'");
        assert_eq!(decode_entities("AT&T &unknown; &"), "AT&T &unknown; &");
    }

    #[test]
    fn test_resolve_redirect() {
        assert_eq!(
            resolve_redirect(
                "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1&rut=abc"
            ),
            "https://example.com/a?b=1"
        );
        assert_eq!(
            resolve_redirect("https://example.com/direct"),
            "https://example.com/direct"
        );
    }
}
