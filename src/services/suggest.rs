use std::sync::Arc;

use tracing::debug;

use crate::clients::ArticleStore;
use crate::constants::limits;
use crate::services::ProfileStore;

/// Tools and topics always available as completion material, so typing
/// still completes when the remote store is down.
const FIXED_TERMS: [&str; 10] = [
    "ChatGPT",
    "Claude",
    "Midjourney",
    "AI tools",
    "artificial intelligence",
    "machine learning",
    "GPT-4",
    "automation",
    "AI news",
    "OpenAI",
];

const TOOL_NAMES: [&str; 5] = ["ChatGPT", "Claude", "Midjourney", "GPT-4", "OpenAI"];

/// Builds typeahead suggestions from phrasing patterns, the user's own
/// history, and article titles, in that precedence order.
pub struct SuggestService {
    store: Arc<dyn ArticleStore>,
    profiles: Arc<ProfileStore>,
}

impl SuggestService {
    #[must_use]
    pub fn new(store: Arc<dyn ArticleStore>, profiles: Arc<ProfileStore>) -> Self {
        Self { store, profiles }
    }

    pub async fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let query = query.trim();
        if query.len() < limits::MIN_SUGGESTION_QUERY_LEN || limit == 0 {
            return Vec::new();
        }

        let mut candidates = smart_completions(query);
        candidates.extend(self.profiles.recent_matches(query, 2));
        candidates.extend(self.profiles.popular_matches(query, 2));
        candidates.extend(self.base_suggestions(query, limit).await);

        dedupe_preserving_order(candidates, limit)
    }

    /// Title-derived and fixed-term completions. Store failures degrade to
    /// the fixed list alone.
    async fn base_suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        let lowered = query.to_lowercase();
        let mut out = Vec::new();

        let remote_limit = limit.saturating_sub(3);
        if remote_limit > 0 {
            match self.store.suggest_titles(query, remote_limit).await {
                Ok(titles) => {
                    // First word in each title that extends the query.
                    for title in titles {
                        if let Some(word) = title.split_whitespace().find(|word| {
                            word.to_lowercase().starts_with(&lowered)
                                && word.len() > query.len()
                        }) {
                            out.push(word.to_string());
                        }
                    }
                }
                Err(err) => debug!("title suggestions unavailable: {err}"),
            }
        }

        for term in FIXED_TERMS {
            if term.to_lowercase().contains(&lowered) {
                out.push(term.to_string());
            }
        }

        out
    }
}

/// Phrase-pattern completions keyed off how the query is worded.
fn smart_completions(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut out = Vec::new();

    for tool in TOOL_NAMES {
        if tool.to_lowercase().starts_with(&lowered) {
            out.push(format!("{tool} review"));
        }
    }

    if lowered.contains(" vs ") || lowered.contains("versus") {
        out.push(format!("{query} comparison"));
        out.push(format!("{query} differences"));
    }

    if lowered.starts_with("how") {
        out.push(format!("{query} tutorial"));
        out.push(format!("{query} guide"));
        out.push(format!("{query} step by step"));
    }

    if lowered.contains("news") || lowered.contains("update") || lowered.contains("latest") {
        out.push(format!("{query} today"));
        out.push(format!("{query} 2025"));
        out.push(format!("{query} breaking"));
    }

    out
}

fn dedupe_preserving_order(candidates: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for candidate in candidates {
        let key = candidate.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(candidate);
            if out.len() == limit {
                break;
            }
        }
    }
    out
}
