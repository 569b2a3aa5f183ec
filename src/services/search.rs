use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::clients::{ArticleStore, SearchOptions};
use crate::constants::cache;
use crate::models::{ContentType, RankedArticle};
use crate::search::query::normalize;
use crate::search::score::relevance_score;
use crate::search::static_index::StaticIndex;
use crate::services::{AnalyticsService, ProfileStore};

/// One remote page plus its outcome. Cached only when `error` is empty.
#[derive(Debug, Clone, Default)]
pub struct RemoteResults {
    pub results: Vec<crate::models::ArticleRecord>,
    pub total: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingTime {
    /// Under three minutes.
    Quick,
    /// Three to ten minutes.
    Medium,
    /// Over ten minutes.
    Long,
}

impl ReadingTime {
    #[must_use]
    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "quick" => Some(Self::Quick),
            "medium" => Some(Self::Medium),
            "long" => Some(Self::Long),
            _ => None,
        }
    }

    const fn matches(self, minutes: u32) -> bool {
        match self {
            Self::Quick => minutes < 3,
            Self::Medium => minutes >= 3 && minutes <= 10,
            Self::Long => minutes > 10,
        }
    }
}

/// Result-level filters applied after both legs are fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedFilters {
    pub min_words: Option<u32>,
    pub max_words: Option<u32>,
    pub author: Option<String>,
    pub breaking_news: bool,
    pub featured_only: bool,
    pub reading_time: Option<ReadingTime>,
}

impl AdvancedFilters {
    fn matches(&self, article: &crate::models::ArticleRecord) -> bool {
        if let Some(min) = self.min_words
            && article.word_count < min
        {
            return false;
        }
        if let Some(max) = self.max_words
            && article.word_count > max
        {
            return false;
        }
        if let Some(author) = self.author.as_deref()
            && !article
                .author
                .to_lowercase()
                .contains(&author.to_lowercase())
        {
            return false;
        }
        if self.breaking_news && !article.breaking_news {
            return false;
        }
        if self.featured_only && !article.featured {
            return false;
        }
        if let Some(reading_time) = self.reading_time
            && !reading_time.matches(article.read_time_minutes())
        {
            return false;
        }
        true
    }
}

/// How many of the total matches each leg contributed.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SourceCounts {
    pub rss: usize,
    pub original: usize,
}

/// The merged, ranked answer to one search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<RankedArticle>,
    /// Matches across both legs before truncation to the page size.
    pub total: usize,
    pub sources: SourceCounts,
    pub cache_hit: bool,
    /// Set when a newer search was issued, or the cache was cleared,
    /// while this one was in flight. Callers should drop stale pages.
    pub stale: bool,
    pub took_ms: u64,
    pub error: Option<String>,
}

/// Merges the remote article store with the original-content index,
/// scores and personalizes the union, and memoizes remote pages.
pub struct SearchService {
    store: Arc<dyn ArticleStore>,
    static_index: StaticIndex,
    profiles: Arc<ProfileStore>,
    analytics: Arc<AnalyticsService>,
    remote_cache: Mutex<TtlCache<String, RemoteResults>>,
    generation: AtomicU64,
}

impl SearchService {
    #[must_use]
    pub fn new(
        store: Arc<dyn ArticleStore>,
        profiles: Arc<ProfileStore>,
        analytics: Arc<AnalyticsService>,
    ) -> Self {
        Self {
            store,
            static_index: StaticIndex::new(),
            profiles,
            analytics,
            remote_cache: Mutex::new(TtlCache::new(cache::SEARCH_CAPACITY, cache::SEARCH_TTL)),
            generation: AtomicU64::new(0),
        }
    }

    /// Search both legs and return one ranked page.
    ///
    /// When both legs are active the remote leg gets 80% of the page and
    /// the original-content index 20%, both rounded up; a static-only
    /// search gets the whole page. Store failures empty the remote leg
    /// and are reported in `error` rather than failing the search.
    pub async fn unified_search(
        &self,
        raw_query: &str,
        options: &SearchOptions,
        filters: &AdvancedFilters,
    ) -> SearchResults {
        let started = Instant::now();
        // Each issued search takes a fresh generation so an overlapped
        // one can see it was overtaken.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = normalize(raw_query);

        let mut cache_hit = false;
        let mut remote = RemoteResults::default();
        if options.include_rss {
            let mut remote_options = options.clone();
            remote_options.limit = (options.limit * 4).div_ceil(5);
            (remote, cache_hit) = self.search_remote(&query, &remote_options).await;
        }

        let static_matches = if options.include_static {
            if options.include_rss {
                self.static_index
                    .search(&query, 0, options.limit.div_ceil(5))
            } else {
                self.static_index
                    .search(&query, options.offset, options.limit)
            }
        } else {
            crate::search::static_index::StaticMatches::default()
        };
        let static_total = static_matches.total;
        let static_page_len = static_matches.results.len();

        let now = Utc::now();
        let mut merged: Vec<RankedArticle> = Vec::with_capacity(
            remote.results.len() + static_matches.results.len(),
        );
        for article in remote.results {
            let score = relevance_score(&article, &query, now);
            merged.push(RankedArticle {
                article,
                content_type: ContentType::Rss,
                relevance_score: score,
            });
        }
        for (article, score) in static_matches.results {
            merged.push(RankedArticle {
                article,
                content_type: ContentType::Original,
                relevance_score: score,
            });
        }

        merged.retain(|ranked| filters.matches(&ranked.article));

        for ranked in &mut merged {
            ranked.relevance_score += self.profiles.interest_bias(&ranked.article.title);
            if self.profiles.is_preferred_source(&ranked.article.source) {
                ranked.relevance_score += crate::constants::scoring::PREFERRED_SOURCE_BONUS;
            }
        }

        merged.sort_by(|a, b| {
            b.boosted_score()
                .partial_cmp(&a.boosted_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // The static leg paginates inside the index, so matches beyond
        // the fetched page still count toward the total.
        let total = merged.len() + static_total.saturating_sub(static_page_len);
        let rss_count = merged
            .iter()
            .filter(|r| r.content_type == ContentType::Rss)
            .count();
        let sources = SourceCounts {
            rss: rss_count,
            original: total - rss_count,
        };
        merged.truncate(options.limit);

        let took = started.elapsed();
        if !query.is_empty() {
            self.analytics.track_search(&query, total);
            self.analytics
                .track_performance(&query, took, total, cache_hit);
            self.profiles.record_search(&query, total);
        }

        SearchResults {
            query,
            results: merged,
            total,
            sources,
            cache_hit,
            stale: self.generation.load(Ordering::SeqCst) != generation,
            took_ms: u64::try_from(took.as_millis()).unwrap_or(u64::MAX),
            error: remote.error,
        }
    }

    /// One remote page, memoized per normalized terms and options. Failed
    /// fetches produce an empty page with the error attached and are never
    /// cached.
    pub async fn search_remote(
        &self,
        terms: &str,
        options: &SearchOptions,
    ) -> (RemoteResults, bool) {
        let key = format!(
            "rss-{terms}-{}",
            serde_json::to_string(options).unwrap_or_default()
        );

        if let Some(hit) = self.remote_cache.lock().expect("cache lock").get(&key) {
            debug!(terms, "remote search served from cache");
            return (hit, true);
        }

        match self.store.search(terms, options).await {
            Ok(records) => {
                let results = RemoteResults {
                    total: records.len(),
                    results: records,
                    error: None,
                };
                self.remote_cache
                    .lock()
                    .expect("cache lock")
                    .insert(key, results.clone());
                (results, false)
            }
            Err(err) => {
                warn!(terms, "remote search failed: {err}");
                self.profiles.record_error("remote_search", &err.to_string());
                (
                    RemoteResults {
                        results: Vec::new(),
                        total: 0,
                        error: Some(err.to_string()),
                    },
                    false,
                )
            }
        }
    }

    /// Newest remote articles, uncached.
    pub async fn latest(
        &self,
        limit: usize,
    ) -> Result<Vec<crate::models::ArticleRecord>, crate::clients::StoreError> {
        self.store.latest(limit).await
    }

    /// Drop all memoized remote pages and flag in-flight searches stale.
    pub fn clear_cache(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.remote_cache.lock().expect("cache lock").clear();
    }

    #[must_use]
    pub fn cached_pages(&self) -> usize {
        self.remote_cache.lock().expect("cache lock").len()
    }
}
