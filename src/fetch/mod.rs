//! Asynchronous media fetch pipeline.
//!
//! A fetch run is search + download composed on the tokio runtime, fully
//! decoupled from the presentation loop.  Completion is reported as one
//! [`FetchOutcome`] over a channel the presentation loop polls; the
//! pipeline itself never touches the media collection.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::FetchConfig;

pub mod download;
pub mod search;

pub use download::download_all;
pub use search::{ExtractStrategy, ImageSearch, MarkupExtractor, PatternExtractor};

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// Result of one complete fetch run.  `Empty` is a normal outcome, not an
/// error: zero search hits and zero valid payloads land here alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// At least one file was written.
    Saved { query: String, paths: Vec<PathBuf> },
    /// The search or every download came up empty.
    Empty { query: String },
}

impl FetchOutcome {
    pub fn query(&self) -> &str {
        match self {
            FetchOutcome::Saved { query, .. } | FetchOutcome::Empty { query } => query,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Build the HTTP client every fetch run shares.
///
/// Falls back to a default client if the builder fails (should never happen
/// in practice).
pub fn build_client(config: &FetchConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Execute one search+download cycle for `query`, saving into `media_dir`.
///
/// Network and file failures are absorbed per-URL; the only observable
/// result is the returned [`FetchOutcome`].
pub async fn run(
    client: reqwest::Client,
    config: FetchConfig,
    query: String,
    count: usize,
    media_dir: &Path,
) -> FetchOutcome {
    log::info!("fetching up to {count} result(s) for {query:?}");

    let urls = ImageSearch::new(client.clone()).search(&query, count).await;
    if urls.is_empty() {
        log::info!("no search results for {query:?}");
        return FetchOutcome::Empty { query };
    }

    let paths = download_all(&client, &config, &urls, media_dir).await;
    if paths.is_empty() {
        FetchOutcome::Empty { query }
    } else {
        FetchOutcome::Saved { query, paths }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_exposes_query_in_both_variants() {
        let saved = FetchOutcome::Saved {
            query: "cyn".into(),
            paths: vec![PathBuf::from("/tmp/a.png")],
        };
        let empty = FetchOutcome::Empty { query: "uzi".into() };
        assert_eq!(saved.query(), "cyn");
        assert_eq!(empty.query(), "uzi");
    }

    #[test]
    fn client_builds_from_default_config() {
        let _client = build_client(&FetchConfig::default());
    }

    #[tokio::test]
    async fn run_with_unreachable_provider_is_empty() {
        // Point the client at nothing routable by using a zero timeout;
        // the pipeline must degrade to Empty instead of erroring.
        let config = FetchConfig {
            timeout_secs: 0,
            ..FetchConfig::default()
        };
        let client = build_client(&config);
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(client, config, "anything".into(), 3, dir.path()).await;
        assert_eq!(
            outcome,
            FetchOutcome::Empty {
                query: "anything".into()
            }
        );
    }
}
