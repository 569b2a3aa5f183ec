use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{limits, retry};
use crate::models::ArticleRecord;

/// Columns requested from the article store. Kept to what search and
/// rendering actually consume.
const SELECT_FIELDS: &str = "id,title,description,content_snippet,link,source,author,pub_date,\
                             category,featured,breaking_news,is_top_story,trending_score,word_count";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("article store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("article store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
    Popular,
}

impl SortBy {
    #[must_use]
    pub fn from_param(param: &str) -> Self {
        match param {
            "date" => Self::Date,
            "popular" => Self::Popular,
            _ => Self::Relevance,
        }
    }

    const fn order_clause(self) -> &'static str {
        match self {
            Self::Relevance => "trending_score.desc",
            Self::Date => "pub_date.desc",
            Self::Popular => "word_count.desc",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Resolve a named range (`today`, `week`, `month`, `quarter`) against
    /// the given clock. Unknown names mean no date filter.
    #[must_use]
    pub fn named(name: &str, now: DateTime<Utc>) -> Option<Self> {
        let start = match name {
            "today" => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map_or(now - ChronoDuration::days(1), |midnight| {
                    midnight.and_utc()
                }),
            "week" => now - ChronoDuration::days(7),
            "month" => now - ChronoDuration::days(30),
            "quarter" => now - ChronoDuration::days(90),
            _ => return None,
        };
        Some(Self {
            start: Some(start),
            end: Some(now),
        })
    }
}

/// Per-call search configuration. Serialized into the cache key, so two
/// calls differing in any field never share a cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub limit: usize,
    pub offset: usize,
    pub date_range: Option<DateRange>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub sort_by: SortBy,
    pub include_static: bool,
    pub include_rss: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: limits::DEFAULT_SEARCH_LIMIT,
            offset: 0,
            date_range: None,
            category: None,
            source: None,
            sort_by: SortBy::Relevance,
            include_static: true,
            include_rss: true,
        }
    }
}

/// Read-only access to the remote article store.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// One page of records matching the filter; errors are the caller's to
    /// swallow or surface.
    async fn search(
        &self,
        terms: &str,
        options: &SearchOptions,
    ) -> Result<Vec<ArticleRecord>, StoreError>;

    /// Titles matching the partial query, ranked by trend signal.
    async fn suggest_titles(&self, terms: &str, limit: usize) -> Result<Vec<String>, StoreError>;

    /// Newest records, retried with backoff since this feeds the primary
    /// content load rather than a keystroke.
    async fn latest(&self, limit: usize) -> Result<Vec<ArticleRecord>, StoreError>;
}

/// PostgREST-style client for the article store.
#[derive(Clone)]
pub struct HttpArticleStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpArticleStore {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn search_url(&self, terms: &str, options: &SearchOptions) -> String {
        let mut url = format!("{}/articles?select={}", self.base_url, SELECT_FIELDS);

        if !terms.is_empty() {
            let encoded = urlencoding::encode(terms);
            url.push_str(&format!(
                "&or=(title.ilike.*{encoded}*,description.ilike.*{encoded}*,\
                 content_snippet.ilike.*{encoded}*,source.ilike.*{encoded}*,\
                 author.ilike.*{encoded}*)"
            ));
        }

        if let Some(range) = &options.date_range {
            if let Some(start) = range.start {
                url.push_str(&format!("&pub_date=gte.{}", start.to_rfc3339()));
            }
            if let Some(end) = range.end {
                url.push_str(&format!("&pub_date=lte.{}", end.to_rfc3339()));
            }
        }

        // Category rows are tagged in the title rather than a dedicated
        // column, so the filter is a title substring match.
        if let Some(category) = options.category.as_deref()
            && category != "all"
        {
            url.push_str(&format!("&title=ilike.*{}*", urlencoding::encode(category)));
        }

        if let Some(source) = options.source.as_deref()
            && source != "all"
        {
            url.push_str(&format!("&source=eq.{}", urlencoding::encode(source)));
        }

        url.push_str(&format!(
            "&order={}&offset={}&limit={}",
            options.sort_by.order_clause(),
            options.offset,
            options.limit
        ));

        url
    }

    async fn fetch_records(&self, url: &str) -> Result<Vec<ArticleRecord>, StoreError> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct TitleRow {
    title: String,
}

#[async_trait]
impl ArticleStore for HttpArticleStore {
    async fn search(
        &self,
        terms: &str,
        options: &SearchOptions,
    ) -> Result<Vec<ArticleRecord>, StoreError> {
        let url = self.search_url(terms, options);
        self.fetch_records(&url).await
    }

    async fn suggest_titles(&self, terms: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let url = format!(
            "{}/articles?select=title&title=ilike.*{}*&order=trending_score.desc&limit={}",
            self.base_url,
            urlencoding::encode(terms),
            limit
        );

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let rows: Vec<TitleRow> = response.json().await?;
        Ok(rows.into_iter().map(|r| r.title).collect())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<ArticleRecord>, StoreError> {
        let url = format!(
            "{}/articles?select={}&order=pub_date.desc&limit={}",
            self.base_url, SELECT_FIELDS, limit
        );

        let mut attempt = 0u32;
        loop {
            match self.fetch_records(&url).await {
                Ok(records) => return Ok(records),
                Err(err) if attempt + 1 < retry::LATEST_ATTEMPTS => {
                    let backoff = retry::LATEST_BASE_DELAY * 2u32.pow(attempt);
                    let jitter =
                        std::time::Duration::from_millis(rand::rng().random_range(0..250));
                    let delay = backoff.min(retry::LATEST_MAX_DELAY) + jitter;

                    warn!(
                        attempt = attempt + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "latest articles fetch failed, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpArticleStore {
        HttpArticleStore::new(Client::new(), "https://store.example.com/rest/v1/", None)
    }

    #[test]
    fn search_url_includes_disjunctive_filter() {
        let url = store().search_url("ai tools", &SearchOptions::default());
        assert!(url.starts_with("https://store.example.com/rest/v1/articles?select="));
        assert!(url.contains("or=(title.ilike.*ai%20tools*"));
        assert!(url.contains("author.ilike.*ai%20tools*)"));
        assert!(url.contains("order=trending_score.desc"));
        assert!(url.contains("offset=0&limit=20"));
    }

    #[test]
    fn empty_terms_skip_the_filter() {
        let url = store().search_url("", &SearchOptions::default());
        assert!(!url.contains("or=("));
        assert!(url.contains("order=trending_score.desc"));
    }

    #[test]
    fn sort_and_filters_map_to_query_params() {
        let options = SearchOptions {
            sort_by: SortBy::Date,
            category: Some("tools".to_string()),
            source: Some("The Verge".to_string()),
            offset: 40,
            limit: 10,
            ..SearchOptions::default()
        };
        let url = store().search_url("claude", &options);
        assert!(url.contains("title=ilike.*tools*"));
        assert!(url.contains("source=eq.The%20Verge"));
        assert!(url.contains("order=pub_date.desc"));
        assert!(url.contains("offset=40&limit=10"));
    }

    #[test]
    fn all_sentinel_disables_category_and_source() {
        let options = SearchOptions {
            category: Some("all".to_string()),
            source: Some("all".to_string()),
            ..SearchOptions::default()
        };
        let url = store().search_url("claude", &options);
        assert!(!url.contains("title=ilike"));
        assert!(!url.contains("source=eq"));
    }

    #[test]
    fn date_range_bounds_both_ends() {
        let now = Utc::now();
        let options = SearchOptions {
            date_range: DateRange::named("week", now),
            ..SearchOptions::default()
        };
        let url = store().search_url("news", &options);
        assert!(url.contains("pub_date=gte."));
        assert!(url.contains("pub_date=lte."));

        assert!(DateRange::named("all", now).is_none());
    }

    #[test]
    fn options_serialize_into_distinct_cache_keys() {
        let a = serde_json::to_string(&SearchOptions::default()).unwrap();
        let b = serde_json::to_string(&SearchOptions {
            offset: 20,
            ..SearchOptions::default()
        })
        .unwrap();
        assert_ne!(a, b);
    }
}
