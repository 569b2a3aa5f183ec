use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::constants::limits;
use crate::services::ProfileStore;

/// Broad shape of what the user typed, derived from phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Tutorial,
    Comparison,
    Recommendation,
    News,
    Review,
    Pricing,
    General,
}

impl QueryType {
    #[must_use]
    pub fn classify(query: &str) -> Self {
        let q = query.to_lowercase();
        if q.contains("how to") || q.contains("tutorial") {
            Self::Tutorial
        } else if q.contains(" vs ") || q.contains("versus") {
            Self::Comparison
        } else if q.contains("best") || q.contains("top") {
            Self::Recommendation
        } else if q.contains("news") || q.contains("latest") {
            Self::News
        } else if q.contains("review") {
            Self::Review
        } else if q.contains("free") || q.contains("price") {
            Self::Pricing
        } else {
            Self::General
        }
    }
}

/// Coarse intent bucket. Commercial cues win over everything, then
/// informational, navigational, and transactional, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserIntent {
    Commercial,
    Informational,
    Navigational,
    Transactional,
}

impl UserIntent {
    #[must_use]
    pub fn detect(query: &str) -> Self {
        let q = query.to_lowercase();
        let any = |cues: &[&str]| cues.iter().any(|cue| q.contains(cue));

        if any(&["buy", "price", "cost", "free", "cheap", "subscription"]) {
            Self::Commercial
        } else if any(&["how", "what", "why", "when", "tutorial", "guide"]) {
            Self::Informational
        } else if any(&["login", "download", "signup", "website"]) {
            Self::Navigational
        } else if any(&["review", "comparison", "vs", "best", "top"]) {
            Self::Transactional
        } else {
            Self::Informational
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchEvent {
    pub query: String,
    pub result_count: usize,
    pub query_type: QueryType,
    pub intent: UserIntent,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermStats {
    pub count: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Neighboring words the term appeared next to, capped.
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSample {
    pub query: String,
    pub duration_ms: u64,
    pub result_count: usize,
    pub cache_hit: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub session_id: String,
    pub total_searches: usize,
    pub avg_duration_ms: f64,
    pub top_queries: Vec<(String, u32)>,
    pub recent_events: Vec<SearchEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsDashboard {
    pub summary: AnalyticsSummary,
    pub term_heatmap: HashMap<String, TermStats>,
    pub slow_searches: Vec<PerformanceSample>,
    pub intent_breakdown: HashMap<String, u32>,
}

#[derive(Default)]
struct AnalyticsState {
    events: Vec<SearchEvent>,
    heatmap: HashMap<String, TermStats>,
    performance: Vec<PerformanceSample>,
}

/// In-memory session analytics with bounded buffers, flushed to the
/// profile store on a timer.
pub struct AnalyticsService {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    state: Mutex<AnalyticsState>,
    profiles: Arc<ProfileStore>,
}

const SLOW_SEARCH: Duration = Duration::from_secs(2);

impl AnalyticsService {
    #[must_use]
    pub fn new(profiles: Arc<ProfileStore>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: Mutex::new(AnalyticsState::default()),
            profiles,
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn track_search(&self, query: &str, result_count: usize) {
        let now = Utc::now();
        let mut state = self.state.lock().expect("analytics lock");

        state.events.push(SearchEvent {
            query: query.to_string(),
            result_count,
            query_type: QueryType::classify(query),
            intent: UserIntent::detect(query),
            timestamp: now,
        });
        if state.events.len() > limits::ANALYTICS_EVENTS {
            let drop = state.events.len() - limits::ANALYTICS_EVENTS;
            state.events.drain(..drop);
        }

        let words: Vec<&str> = query.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            let term = word.to_lowercase();
            if term.len() <= 2 {
                continue;
            }

            let mut context = String::new();
            if i > 0 {
                context.push_str(words[i - 1]);
            }
            context.push(' ');
            if i + 1 < words.len() {
                context.push_str(words[i + 1]);
            }
            let context = context.trim().to_string();

            let stats = state.heatmap.entry(term).or_insert_with(|| TermStats {
                count: 0,
                first_seen: now,
                last_seen: now,
                contexts: Vec::new(),
            });
            stats.count += 1;
            stats.last_seen = now;
            if !context.is_empty()
                && !stats.contexts.contains(&context)
                && stats.contexts.len() < limits::HEATMAP_CONTEXTS
            {
                stats.contexts.push(context);
            }
        }
    }

    pub fn track_performance(
        &self,
        query: &str,
        duration: Duration,
        result_count: usize,
        cache_hit: bool,
    ) {
        if duration > SLOW_SEARCH {
            warn!(
                query,
                duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                "slow search"
            );
        }

        let mut state = self.state.lock().expect("analytics lock");
        state.performance.push(PerformanceSample {
            query: query.to_string(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            result_count,
            cache_hit,
            timestamp: Utc::now(),
        });
        if state.performance.len() > limits::PERF_SAMPLES_HIGH_WATER {
            let keep_from = state.performance.len() - limits::PERF_SAMPLES_KEEP;
            state.performance.drain(..keep_from);
        }
    }

    #[must_use]
    pub fn summary(&self) -> AnalyticsSummary {
        let state = self.state.lock().expect("analytics lock");

        let avg_duration_ms = if state.performance.is_empty() {
            0.0
        } else {
            state
                .performance
                .iter()
                .map(|s| s.duration_ms as f64)
                .sum::<f64>()
                / state.performance.len() as f64
        };

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for event in &state.events {
            *counts.entry(event.query.as_str()).or_insert(0) += 1;
        }
        let mut top_queries: Vec<(String, u32)> = counts
            .into_iter()
            .map(|(q, c)| (q.to_string(), c))
            .collect();
        top_queries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_queries.truncate(10);

        let recent_events = state.events.iter().rev().take(10).cloned().collect();

        AnalyticsSummary {
            session_id: self.session_id.to_string(),
            total_searches: state.events.len(),
            avg_duration_ms,
            top_queries,
            recent_events,
        }
    }

    #[must_use]
    pub fn dashboard(&self) -> AnalyticsDashboard {
        let summary = self.summary();
        let state = self.state.lock().expect("analytics lock");

        let slow_ms = u64::try_from(SLOW_SEARCH.as_millis()).unwrap_or(u64::MAX);
        let slow_searches = state
            .performance
            .iter()
            .filter(|s| s.duration_ms > slow_ms)
            .cloned()
            .collect();

        let mut intent_breakdown: HashMap<String, u32> = HashMap::new();
        for event in &state.events {
            let key = serde_json::to_value(event.intent)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "informational".to_string());
            *intent_breakdown.entry(key).or_insert(0) += 1;
        }

        AnalyticsDashboard {
            summary,
            term_heatmap: state.heatmap.clone(),
            slow_searches,
            intent_breakdown,
        }
    }

    /// Write the current session view next to the profile. Called on a
    /// timer and at shutdown.
    pub fn flush(&self) {
        let dashboard = self.dashboard();
        let snapshot = serde_json::json!({
            "session_id": self.session_id.to_string(),
            "started_at": self.started_at,
            "flushed_at": Utc::now(),
            "dashboard": dashboard,
        });
        self.profiles.save_analytics_snapshot(&snapshot);
    }
}
