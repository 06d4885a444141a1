//! Remote card catalog client
//!
//! Fetches card records by name and fills the card cache. Requests are
//! spaced out by a fixed delay and retried with exponential backoff on
//! transient failures.

use crate::config::CatalogConfig;
use crate::core::Card;
use crate::loader::cache::{card_key, CardCache};
use crate::{CubeError, Result};
use reqwest::StatusCode;
use std::time::Duration;

/// Floor for the first backoff step when the request delay is zero
const MIN_BACKOFF: Duration = Duration::from_millis(50);

/// Result of filling the cache from the catalog
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub fetched: usize,
    /// Names the catalog has no record for
    pub missing: Vec<String>,
    /// Names that could not be fetched, with the last error
    pub failed: Vec<(String, String)>,
}

impl FetchSummary {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

/// HTTP client for the card catalog
pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("cubealyzer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(CatalogClient { http, config })
    }

    fn cards_url(&self) -> String {
        format!("{}/mtg/cards", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch one card, retrying transient failures
    ///
    /// The catalog answers a name query with every card whose name contains
    /// it. The first exact name match is kept, or the first result when no
    /// name matches.
    pub async fn fetch_card(&self, name: &str) -> Result<Card> {
        let mut attempt = 0;
        loop {
            match self.try_fetch(name).await {
                Ok(card) => return Ok(card),
                Err(Attempt::Retry(e)) if attempt < self.config.max_retries => {
                    let delay = backoff_delay(self.config.request_delay, attempt);
                    tracing::warn!(
                        card = name,
                        attempt,
                        ?delay,
                        error = %e,
                        "catalog request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(Attempt::Retry(e)) | Err(Attempt::Fatal(e)) => return Err(e),
            }
        }
    }

    async fn try_fetch(&self, name: &str) -> std::result::Result<Card, Attempt> {
        let response = self
            .http
            .get(self.cards_url())
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    Attempt::Retry(e.into())
                } else {
                    Attempt::Fatal(e.into())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Attempt::Fatal(CubeError::CardNotFound(name.to_string())));
        }
        if is_retryable(status) {
            return Err(Attempt::Retry(CubeError::CatalogError(format!(
                "status {status} for '{name}'"
            ))));
        }
        if !status.is_success() {
            return Err(Attempt::Fatal(CubeError::CatalogError(format!(
                "status {status} for '{name}'"
            ))));
        }

        let cards: Vec<Card> = response
            .json()
            .await
            .map_err(|e| Attempt::Fatal(e.into()))?;
        best_match(cards, name)
            .ok_or_else(|| Attempt::Fatal(CubeError::CardNotFound(name.to_string())))
    }

    /// Fetch every name not yet in the cache
    ///
    /// Failures are collected in the summary instead of aborting, so one bad
    /// name never loses the rest of the download.
    pub async fn populate<'a>(
        &self,
        cache: &mut CardCache,
        names: impl IntoIterator<Item = &'a str>,
    ) -> FetchSummary {
        let mut summary = FetchSummary::default();

        for name in names {
            if cache.contains(name) {
                continue;
            }

            tokio::time::sleep(self.config.request_delay).await;
            tracing::info!(card = name, "fetching from catalog");

            match self.fetch_card(name).await {
                Ok(card) => {
                    cache.insert(name, card);
                    summary.fetched += 1;
                }
                Err(CubeError::CardNotFound(_)) => {
                    tracing::warn!(card = name, "catalog has no such card");
                    summary.missing.push(name.to_string());
                }
                Err(e) => {
                    tracing::warn!(card = name, error = %e, "giving up on card");
                    summary.failed.push((name.to_string(), e.to_string()));
                }
            }
        }

        summary
    }
}

enum Attempt {
    Retry(CubeError),
    Fatal(CubeError),
}

/// First card named `name` (ignoring case), else the first card
fn best_match(cards: Vec<Card>, name: &str) -> Option<Card> {
    let wanted = card_key(name);
    match cards.iter().position(|card| card_key(&card.name) == wanted) {
        Some(i) => cards.into_iter().nth(i),
        None => cards.into_iter().next(),
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt` (0-based): base, 2x base, 4x base, ...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.max(MIN_BACKOFF)
        .saturating_mul(2u32.saturating_pow(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned HTTP responses in order, one per connection
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let reply = format!(
                    "HTTP/1.1 {status} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), hits)
    }

    fn client(base_url: String) -> CatalogClient {
        CatalogClient::new(CatalogConfig {
            base_url,
            request_delay: Duration::ZERO,
            max_retries: 2,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    const BOLT: &str = r#"[{"name": "Lightning Bolt", "cost": "{R}", "cmc": 1, "types": ["instant"], "subtypes": []},
                          {"name": "Lightning Bolt", "cost": "{R}", "cmc": 1, "types": ["instant"]}]"#;

    #[test]
    fn test_backoff_delay() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
        assert_eq!(backoff_delay(Duration::ZERO, 0), MIN_BACKOFF);
    }

    #[test]
    fn test_best_match_prefers_exact_name() {
        let cards = vec![
            Card::new("Optimus", "{2}{U}", 3),
            Card::new("OPT", "{U}", 1),
            Card::new("Opt", "{U}", 1).with_types(&["instant"]),
        ];
        let card = best_match(cards, "opt").unwrap();
        assert_eq!(card.name, "OPT");

        let fallback = best_match(vec![Card::new("Optimus", "{2}{U}", 3)], "Opt").unwrap();
        assert_eq!(fallback.name, "Optimus");
        assert!(best_match(Vec::new(), "Opt").is_none());
    }

    #[tokio::test]
    async fn test_fetch_skips_partial_name_matches() {
        const OPT: &str = r#"[{"name": "Opt Out", "cost": "{2}{U}", "cmc": 3, "types": ["sorcery"]},
                             {"name": "Opt", "cost": "{U}", "cmc": 1, "types": ["instant"]}]"#;
        let (url, _) = serve(vec![(200, OPT)]).await;
        let card = client(url).fetch_card("Opt").await.unwrap();
        assert_eq!(card.name, "Opt");
        assert_eq!(card.cost, "{U}");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_fetch_keeps_first_result() {
        let (url, hits) = serve(vec![(200, BOLT)]).await;
        let card = client(url).fetch_card("Lightning Bolt").await.unwrap();
        assert_eq!(card.name, "Lightning Bolt");
        assert_eq!(card.cost, "{R}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors() {
        let (url, hits) = serve(vec![(503, "{}"), (429, "{}"), (200, BOLT)]).await;
        let card = client(url).fetch_card("Lightning Bolt").await.unwrap();
        assert_eq!(card.cmc.value(), 1.0);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_gives_up_after_max_retries() {
        let (url, hits) = serve(vec![(500, "{}"), (500, "{}"), (500, "{}")]).await;
        let err = client(url).fetch_card("Lightning Bolt").await.unwrap_err();
        assert!(matches!(err, CubeError::CatalogError(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_found() {
        let (url, _) = serve(vec![(200, "[]")]).await;
        let err = client(url).fetch_card("Nonexistent").await.unwrap_err();
        assert!(matches!(err, CubeError::CardNotFound(_)));
    }

    #[tokio::test]
    async fn test_populate_skips_cached_and_reports_missing() {
        let (url, hits) = serve(vec![(200, BOLT), (404, "")]).await;
        let mut cache = CardCache::new();
        cache.insert("Forest", Card::new("Forest", "", 0));

        let summary = client(url)
            .populate(&mut cache, ["Forest", "Lightning Bolt", "Nonexistent"])
            .await;

        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.missing, vec!["Nonexistent".to_string()]);
        assert!(summary.failed.is_empty());
        assert!(!summary.is_complete());
        assert!(cache.contains("lightning bolt"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
