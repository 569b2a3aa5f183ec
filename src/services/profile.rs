use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Timelike, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::limits;
use crate::constants::scoring::INTEREST_WEIGHT;

const PROFILE_FILE: &str = "profile.json";
const RECENT_FILE: &str = "recent_searches.json";
const POPULAR_FILE: &str = "popular_searches.json";
const ERROR_LOG_FILE: &str = "error_log.json";
const ANALYTICS_FILE: &str = "analytics.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Search-term occurrence counts, the input to the personalization bias.
    pub interests: HashMap<String, u32>,
    pub search_history: Vec<HistoryEntry>,
    pub preferred_sources: Vec<String>,
    /// Searches per hour-of-day.
    pub search_patterns: HashMap<u8, u32>,
    pub created: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Default for UserProfile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            interests: HashMap::new(),
            search_history: Vec::new(),
            preferred_sources: Vec::new(),
            search_patterns: HashMap::new(),
            created: now,
            last_active: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub result_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularSearch {
    pub query: String,
    pub count: u32,
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub message: String,
}

/// Per-install usage state, persisted as small capped JSON documents.
///
/// Persistence failures are logged and otherwise ignored; losing the profile
/// degrades personalization, nothing else.
pub struct ProfileStore {
    data_dir: PathBuf,
    profile: Mutex<UserProfile>,
    recent: Mutex<Vec<String>>,
    popular: Mutex<Vec<PopularSearch>>,
    errors: Mutex<Vec<ErrorLogEntry>>,
}

impl ProfileStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            profile: Mutex::new(load_json(&data_dir.join(PROFILE_FILE))),
            recent: Mutex::new(load_json(&data_dir.join(RECENT_FILE))),
            popular: Mutex::new(load_json(&data_dir.join(POPULAR_FILE))),
            errors: Mutex::new(load_json(&data_dir.join(ERROR_LOG_FILE))),
            data_dir,
        })
    }

    /// Fold one completed search into the profile, recent list, and popular
    /// counts.
    pub fn record_search(&self, query: &str, result_count: usize) {
        let now = Utc::now();

        {
            let mut profile = self.profile.lock().expect("profile lock");

            for term in crate::search::query::significant_terms(query, 2) {
                *profile.interests.entry(term).or_insert(0) += 1;
            }

            let hour = u8::try_from(now.hour()).unwrap_or(0);
            *profile.search_patterns.entry(hour).or_insert(0) += 1;
            profile.last_active = now;

            profile.search_history.push(HistoryEntry {
                query: query.to_string(),
                timestamp: now,
                result_count,
            });
            if profile.search_history.len() > limits::SEARCH_HISTORY_HIGH_WATER {
                let keep_from = profile.search_history.len() - limits::SEARCH_HISTORY_KEEP;
                profile.search_history.drain(..keep_from);
            }

            self.persist(PROFILE_FILE, &*profile);
        }

        if query.len() > 2 {
            let mut recent = self.recent.lock().expect("recent lock");
            recent.retain(|q| !q.eq_ignore_ascii_case(query));
            recent.insert(0, query.to_string());
            recent.truncate(limits::RECENT_SEARCHES);
            self.persist(RECENT_FILE, &*recent);
        }

        if result_count > 0 {
            let mut popular = self.popular.lock().expect("popular lock");
            if let Some(entry) = popular
                .iter_mut()
                .find(|p| p.query.eq_ignore_ascii_case(query))
            {
                entry.count += 1;
                entry.last_used = now;
            } else {
                popular.push(PopularSearch {
                    query: query.to_string(),
                    count: 1,
                    last_used: now,
                });
            }

            popular.sort_by(|a, b| {
                popular_rank(b, now)
                    .partial_cmp(&popular_rank(a, now))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            popular.truncate(limits::POPULAR_SEARCHES);
            self.persist(POPULAR_FILE, &*popular);
        }
    }

    /// Remember a source the user opened a result from, newest-last, capped.
    pub fn mark_preferred_source(&self, source: &str) {
        if source.is_empty() {
            return;
        }
        let mut profile = self.profile.lock().expect("profile lock");
        if !profile.preferred_sources.iter().any(|s| s == source) {
            profile.preferred_sources.push(source.to_string());
        }
        if profile.preferred_sources.len() > limits::PREFERRED_SOURCES {
            let drop = profile.preferred_sources.len() - limits::PREFERRED_SOURCES;
            profile.preferred_sources.drain(..drop);
        }
        self.persist(PROFILE_FILE, &*profile);
    }

    /// Linear interest bias for a candidate title: the sum of stored counts
    /// for each title word, scaled by the interest weight. No decay.
    #[must_use]
    pub fn interest_bias(&self, title: &str) -> f64 {
        let profile = self.profile.lock().expect("profile lock");
        title
            .to_lowercase()
            .split_whitespace()
            .filter_map(|word| profile.interests.get(word))
            .map(|count| f64::from(*count) * INTEREST_WEIGHT)
            .sum()
    }

    #[must_use]
    pub fn is_preferred_source(&self, source: &str) -> bool {
        let profile = self.profile.lock().expect("profile lock");
        profile.preferred_sources.iter().any(|s| s == source)
    }

    /// Recent searches containing the query, for the suggestion union.
    #[must_use]
    pub fn recent_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let query = query.to_lowercase();
        self.recent
            .lock()
            .expect("recent lock")
            .iter()
            .filter(|q| q.to_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn popular_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let query = query.to_lowercase();
        self.popular
            .lock()
            .expect("popular lock")
            .iter()
            .filter(|p| p.query.to_lowercase().contains(&query))
            .take(limit)
            .map(|p| p.query.clone())
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> UserProfile {
        self.profile.lock().expect("profile lock").clone()
    }

    #[must_use]
    pub fn recent_searches(&self) -> Vec<String> {
        self.recent.lock().expect("recent lock").clone()
    }

    #[must_use]
    pub fn popular_searches(&self) -> Vec<PopularSearch> {
        self.popular.lock().expect("popular lock").clone()
    }

    /// Append to the bounded error log.
    pub fn record_error(&self, context: &str, message: &str) {
        let mut errors = self.errors.lock().expect("errors lock");
        errors.push(ErrorLogEntry {
            timestamp: Utc::now(),
            context: context.to_string(),
            message: message.to_string(),
        });
        if errors.len() > limits::ERROR_LOG_ENTRIES {
            let drop = errors.len() - limits::ERROR_LOG_ENTRIES;
            errors.drain(..drop);
        }
        self.persist(ERROR_LOG_FILE, &*errors);
    }

    #[must_use]
    pub fn error_log(&self) -> Vec<ErrorLogEntry> {
        self.errors.lock().expect("errors lock").clone()
    }

    /// Persist the periodic analytics snapshot next to the profile.
    pub fn save_analytics_snapshot(&self, snapshot: &serde_json::Value) {
        self.persist(ANALYTICS_FILE, snapshot);
    }

    /// Drop all persisted personalization state.
    pub fn clear(&self) {
        *self.profile.lock().expect("profile lock") = UserProfile::default();
        self.recent.lock().expect("recent lock").clear();
        self.popular.lock().expect("popular lock").clear();
        self.errors.lock().expect("errors lock").clear();

        self.persist(PROFILE_FILE, &UserProfile::default());
        self.persist(RECENT_FILE, &Vec::<String>::new());
        self.persist(POPULAR_FILE, &Vec::<PopularSearch>::new());
        self.persist(ERROR_LOG_FILE, &Vec::<ErrorLogEntry>::new());
    }

    fn persist<T: Serialize>(&self, file: &str, value: &T) {
        let path = self.data_dir.join(file);
        let result = serde_json::to_vec_pretty(value)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(anyhow::Error::from));
        if let Err(e) = result {
            warn!("failed to persist {}: {e}", path.display());
        }
    }
}

/// Popularity rank used for ordering and truncation: usage count weighted
/// against days since last use.
fn popular_rank(entry: &PopularSearch, now: DateTime<Utc>) -> f64 {
    let days_since = now
        .signed_duration_since(entry.last_used)
        .num_seconds()
        .max(0) as f64
        / 86_400.0;
    f64::from(entry.count) * 0.7 + days_since * 0.3
}

fn load_json<T: Default + DeserializeOwned>(path: &Path) -> T {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("ignoring corrupt state file {}: {e}", path.display());
            T::default()
        }),
        Err(_) => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ProfileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn interests_accumulate_and_bias_titles() {
        let (_dir, store) = store();
        store.record_search("claude review", 3);
        store.record_search("claude pricing", 2);

        let bias = store.interest_bias("Claude ships a new model");
        assert!((bias - 0.2).abs() < 1e-9, "bias was {bias}");

        assert!(store.interest_bias("unrelated headline").abs() < f64::EPSILON);
    }

    #[test]
    fn short_terms_are_not_interests() {
        let (_dir, store) = store();
        store.record_search("ai vs ml", 1);
        let profile = store.snapshot();
        assert!(profile.interests.is_empty());
    }

    #[test]
    fn recent_searches_dedupe_case_insensitively() {
        let (_dir, store) = store();
        store.record_search("ChatGPT tips", 1);
        store.record_search("midjourney", 1);
        store.record_search("chatgpt tips", 1);

        let recent = store.recent_searches();
        assert_eq!(recent[0], "chatgpt tips");
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn zero_result_searches_never_become_popular() {
        let (_dir, store) = store();
        store.record_search("asdfghjkl", 0);
        assert!(store.popular_searches().is_empty());
    }

    #[test]
    fn preferred_sources_cap_keeps_newest() {
        let (_dir, store) = store();
        for i in 0..15 {
            store.mark_preferred_source(&format!("source-{i}"));
        }
        let profile = store.snapshot();
        assert_eq!(profile.preferred_sources.len(), 10);
        assert_eq!(profile.preferred_sources[0], "source-5");
        assert!(store.is_preferred_source("source-14"));
        assert!(!store.is_preferred_source("source-0"));
    }

    #[test]
    fn history_truncates_to_recent_half() {
        let (_dir, store) = store();
        for i in 0..101 {
            store.record_search(&format!("query number {i}"), 1);
        }
        let profile = store.snapshot();
        assert_eq!(profile.search_history.len(), 50);
        assert_eq!(profile.search_history.last().unwrap().query, "query number 100");
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ProfileStore::open(dir.path()).unwrap();
            store.record_search("claude agents", 4);
        }
        let store = ProfileStore::open(dir.path()).unwrap();
        assert_eq!(store.recent_searches(), vec!["claude agents".to_string()]);
        assert!(store.interest_bias("claude") > 0.0);
    }

    #[test]
    fn error_log_is_bounded() {
        let (_dir, store) = store();
        for i in 0..60 {
            store.record_error("search", &format!("failure {i}"));
        }
        let log = store.error_log();
        assert_eq!(log.len(), 50);
        assert_eq!(log.last().unwrap().message, "failure 59");
    }

    #[test]
    fn clear_resets_everything() {
        let (_dir, store) = store();
        store.record_search("chatgpt news", 2);
        store.mark_preferred_source("Wired");
        store.clear();

        assert!(store.recent_searches().is_empty());
        assert!(store.popular_searches().is_empty());
        assert!(store.snapshot().interests.is_empty());
        assert!(!store.is_preferred_source("Wired"));
    }
}
