use chrono::{DateTime, Utc};

use crate::constants::scoring;
use crate::models::ArticleRecord;

/// Additive relevance heuristic for one article against a normalized query.
///
/// Every boost is independent and summed, so satisfying an extra condition
/// can never lower the score. An empty query scores zero regardless of the
/// record's own flags.
#[must_use]
pub fn relevance_score(article: &ArticleRecord, terms: &str, now: DateTime<Utc>) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }

    let terms = terms.to_lowercase();
    let mut score = 0.0;

    if article.title.to_lowercase().contains(&terms) {
        score += scoring::TITLE_MATCH;
    }
    if article.description.to_lowercase().contains(&terms) {
        score += scoring::DESCRIPTION_MATCH;
    }
    if article.content_snippet.to_lowercase().contains(&terms) {
        score += scoring::CONTENT_MATCH;
    }

    if article.featured {
        score += scoring::FEATURED;
    }
    if article.breaking_news {
        score += scoring::BREAKING_NEWS;
    }
    if article.is_top_story {
        score += scoring::TOP_STORY;
    }

    if let Some(pub_date) = article.pub_date {
        let age = now.signed_duration_since(pub_date);
        if age <= chrono::Duration::days(7) {
            score += scoring::RECENT_WEEK;
        }
        if age <= chrono::Duration::days(1) {
            score += scoring::RECENT_DAY;
        }
    }

    if article.word_count > scoring::LONG_FORM_WORDS {
        score += scoring::LONG_FORM;
    }

    score
}
