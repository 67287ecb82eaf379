//! Image search with heuristic URL extraction.
//!
//! The search provider returns unstructured markup; candidate image URLs
//! are pulled out by a list of [`ExtractStrategy`] implementations tried in
//! order, first non-empty result wins.  Both strategies target the Bing
//! image-search page: result anchors carry an `m` attribute whose value is
//! a JSON blob with a `murl` (media URL) field.

use regex::Regex;
use scraper::{Html, Selector};

// ---------------------------------------------------------------------------
// Extraction strategies
// ---------------------------------------------------------------------------

/// One way of pulling candidate image URLs out of a search results page.
///
/// Implementations must be pure over the markup: no network, no I/O.  An
/// empty result is a normal outcome (markup drift, zero matches), never an
/// error.
pub trait ExtractStrategy: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Extract up to `max_results` candidate URLs from `html`.
    fn extract(&self, html: &str, max_results: usize) -> Vec<String>;
}

/// Structural extraction: walk `<a class="iusc">` result anchors and parse
/// the JSON blob in their `m` attribute.
pub struct MarkupExtractor;

impl ExtractStrategy for MarkupExtractor {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn extract(&self, html: &str, max_results: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("a.iusc") else {
            return Vec::new();
        };

        let mut urls = Vec::new();
        for anchor in document.select(&selector) {
            let Some(blob) = anchor.value().attr("m") else {
                continue;
            };
            let Ok(meta) = serde_json::from_str::<serde_json::Value>(blob) else {
                continue;
            };
            if let Some(url) = meta.get("murl").and_then(|v| v.as_str()) {
                if url.starts_with("http") {
                    urls.push(url.to_string());
                    if urls.len() >= max_results {
                        break;
                    }
                }
            }
        }
        urls
    }
}

/// Textual fallback: regex over embedded data blobs for `"murl":"…"`
/// pairs.  Survives markup reshuffles that break the structural walk.
pub struct PatternExtractor {
    pattern: Regex,
}

impl PatternExtractor {
    pub fn new() -> Self {
        Self {
            // The character class excludes the closing quote, so escaped
            // sequences inside the URL are not a concern here.
            pattern: Regex::new(r#""murl":"(https?://[^"]+)""#)
                .unwrap_or_else(|e| unreachable!("invalid murl pattern: {e}")),
        }
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractStrategy for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, html: &str, max_results: usize) -> Vec<String> {
        self.pattern
            .captures_iter(html)
            .take(max_results)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().replace("\\/", "/"))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ImageSearch
// ---------------------------------------------------------------------------

/// Best-effort image search over the provider's HTML endpoint.
pub struct ImageSearch {
    client: reqwest::Client,
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl ImageSearch {
    /// Build a search backed by `client`, with the default strategy order:
    /// structural first, textual pattern as fallback.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            strategies: vec![Box::new(MarkupExtractor), Box::new(PatternExtractor::new())],
        }
    }

    /// Search for `query` and return up to `max_results` candidate URLs.
    ///
    /// Any failure (network, non-success status, extraction drift) yields
    /// an empty vector; callers must treat empty as a normal outcome.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        let encoded = urlencoding::encode(query);
        let url = format!("https://www.bing.com/images/search?q={encoded}");

        let html = match self.fetch_page(&url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("image search request failed: {e}");
                return Vec::new();
            }
        };

        self.extract_all(&html, max_results)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }

    fn extract_all(&self, html: &str, max_results: usize) -> Vec<String> {
        for strategy in &self.strategies {
            let urls = strategy.extract(html, max_results);
            if !urls.is_empty() {
                log::debug!("{} strategy yielded {} url(s)", strategy.name(), urls.len());
                return urls;
            }
        }
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
