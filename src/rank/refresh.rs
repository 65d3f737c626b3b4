//! Batch rank refresh.
//!
//! Keywords are resolved one at a time. Live requests are spaced by a fixed
//! delay to stay under the SERP provider's rate limit. A failure for one
//! keyword is recorded and the batch moves on; nothing is retried.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::auth::UserContext;
use crate::observability::metrics;
use crate::providers::Mode;
use crate::rank::resolver::RankResolver;
use crate::store::{Keyword, Product, Rank, Store};

/// A keyword that could not be refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordError {
    pub keyword_id: Uuid,
    pub phrase: String,
    pub error: String,
}

/// Outcome of one refresh run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshReport {
    pub mode: Mode,
    pub refreshed: usize,
    pub found: usize,
    pub not_found: usize,
    pub ranks: Vec<Rank>,
    pub errors: Vec<KeywordError>,
}

impl RefreshReport {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            refreshed: 0,
            found: 0,
            not_found: 0,
            ranks: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, keyword: &Keyword, error: impl ToString) {
        let error = error.to_string();
        tracing::warn!(keyword_id = %keyword.id, phrase = %keyword.phrase, error = %error, "Rank refresh failed for keyword");
        metrics::record_rank_fetch(self.mode.as_str(), "error");
        self.errors.push(KeywordError {
            keyword_id: keyword.id,
            phrase: keyword.phrase.clone(),
            error,
        });
    }
}

/// Serial rank refresher.
pub struct RankRefresher<'a> {
    store: &'a Store,
    resolver: RankResolver,
    delay: Duration,
}

impl<'a> RankRefresher<'a> {
    pub fn new(store: &'a Store, resolver: RankResolver, delay: Duration) -> Self {
        Self { store, resolver, delay }
    }

    /// Refresh `keywords`, resolving each against its product's listing URL.
    pub async fn refresh(&self, user: &UserContext, keywords: &[Keyword], products: &[Product]) -> RefreshReport {
        let urls: HashMap<Uuid, Option<&str>> = products
            .iter()
            .map(|p| (p.id, p.source_url.as_deref()))
            .collect();
        let mode = self.resolver.mode();
        let mut report = RefreshReport::new(mode);
        let started = Instant::now();
        let mut sent_live_request = false;

        tracing::info!(keywords = keywords.len(), mode = mode.as_str(), "Starting rank refresh");

        for keyword in keywords {
            let url = match urls.get(&keyword.product_id) {
                None => {
                    report.fail(keyword, "product no longer exists");
                    continue;
                }
                Some(None) => {
                    report.fail(keyword, "product has no listing URL");
                    continue;
                }
                Some(Some(url)) => *url,
            };

            if mode == Mode::Live {
                if sent_live_request {
                    tokio::time::sleep(self.delay).await;
                }
                sent_live_request = true;
            }

            let position = match self
                .resolver
                .resolve(&keyword.phrase, url, &keyword.country, keyword.device)
                .await
            {
                Ok(position) => position,
                Err(e) => {
                    report.fail(keyword, e);
                    continue;
                }
            };

            match self.store.insert_rank(user, Rank::record(keyword.id, position)).await {
                Ok(rank) => {
                    report.refreshed += 1;
                    if rank.position.is_some() {
                        report.found += 1;
                        metrics::record_rank_fetch(mode.as_str(), "found");
                    } else {
                        report.not_found += 1;
                        metrics::record_rank_fetch(mode.as_str(), "not_found");
                    }
                    report.ranks.push(rank);
                }
                Err(e) => report.fail(keyword, e),
            }
        }

        tracing::info!(
            refreshed = report.refreshed,
            found = report.found,
            errors = report.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rank refresh complete"
        );
        report
    }
}

/// Latest rank per keyword from a newest-first history.
pub fn latest_by_keyword(history: &[Rank]) -> HashMap<Uuid, Rank> {
    let mut latest: HashMap<Uuid, Rank> = HashMap::new();
    for rank in history {
        latest
            .entry(rank.keyword_id)
            .and_modify(|current| {
                if rank.fetched_at > current.fetched_at {
                    *current = rank.clone();
                }
            })
            .or_insert_with(|| rank.clone());
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewKeyword, NewProduct};
    use chrono::{Duration as ChronoDuration, Utc};

    fn user() -> UserContext {
        UserContext {
            user_id: Uuid::new_v4(),
            email: "seller@example.com".into(),
            access_token: "token".into(),
        }
    }

    async fn seed(store: &Store, user: &UserContext, url: Option<&str>, phrase: &str) -> (Product, Keyword) {
        let product = store
            .insert_products(
                user,
                vec![Product::create(
                    user.user_id,
                    NewProduct {
                        title: format!("Product for {}", phrase),
                        source_url: url.map(String::from),
                        ..Default::default()
                    },
                )],
            )
            .await
            .unwrap()
            .remove(0);
        let keyword = store
            .insert_keyword(
                user,
                Keyword::create(
                    user.user_id,
                    NewKeyword {
                        product_id: product.id,
                        phrase: phrase.into(),
                        country: "us".into(),
                        device: Default::default(),
                    },
                ),
            )
            .await
            .unwrap();
        (product, keyword)
    }

    #[tokio::test]
    async fn test_failed_keyword_does_not_stop_batch() {
        let store = Store::Memory(MemoryStore::new(None));
        let user = user();
        let (p1, k1) = seed(&store, &user, None, "no url").await;
        let (p2, k2) = seed(&store, &user, Some("https://example.com/p/2"), "math worksheets").await;
        let (p3, k3) = seed(&store, &user, Some("https://example.com/p/3"), "fractions").await;

        let refresher = RankRefresher::new(&store, RankResolver::new(None, 50), Duration::from_secs(1));
        let report = refresher
            .refresh(&user, &[k1.clone(), k2, k3], &[p1, p2, p3])
            .await;

        assert_eq!(report.mode, Mode::Stub);
        assert_eq!(report.refreshed, 2);
        assert_eq!(report.found + report.not_found, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].keyword_id, k1.id);
        assert_eq!(report.errors[0].error, "product has no listing URL");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stub_mode_does_not_wait() {
        let store = Store::Memory(MemoryStore::new(None));
        let user = user();
        let (p, k) = seed(&store, &user, Some("https://example.com/p"), "math worksheets").await;

        let refresher = RankRefresher::new(&store, RankResolver::new(None, 50), Duration::from_secs(60));
        let before = tokio::time::Instant::now();
        let report = refresher.refresh(&user, &[k.clone(), k], &[p]).await;

        assert_eq!(report.refreshed, 2);
        assert_eq!(report.ranks[0].position, report.ranks[1].position);
        assert!(before.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn test_latest_by_keyword() {
        let keyword_id = Uuid::new_v4();
        let mut old = Rank::record(keyword_id, Some(9));
        old.fetched_at = Utc::now() - ChronoDuration::days(1);
        let new = Rank::record(keyword_id, Some(3));

        let latest = latest_by_keyword(&[old, new.clone()]);
        assert_eq!(latest[&keyword_id].position, Some(3));
    }
}
