use chrono::{DateTime, Utc};
use regex::RegexBuilder;

use crate::services::search::SearchResults;

const EXCERPT_CHARS: usize = 200;

/// Escape text and wrap query-term matches in `<mark>`.
///
/// Single-character terms are skipped; highlighting "a" across a whole
/// excerpt is noise. Escaping happens first so the inserted tags are the
/// only markup in the output.
#[must_use]
pub fn highlight_terms(text: &str, query: &str) -> String {
    let mut out = html_escape::encode_text(text).into_owned();

    for term in query.split_whitespace().filter(|t| t.len() > 1) {
        let pattern = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build();
        if let Ok(pattern) = pattern {
            out = pattern
                .replace_all(&out, |caps: &regex::Captures| {
                    format!("<mark>{}</mark>", &caps[0])
                })
                .into_owned();
        }
    }

    out
}

/// Clip to the excerpt length on a character boundary, with an ellipsis
/// when anything was cut.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let clipped: String = text.chars().take(max_chars).collect();
    format!("{clipped}...")
}

/// Coarse relative timestamp, largest unit only.
#[must_use]
pub fn format_time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(date).num_seconds().max(0);

    let units: [(i64, &str); 6] = [
        (31_536_000, "year"),
        (2_592_000, "month"),
        (604_800, "week"),
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
    ];

    for (span, unit) in units {
        let count = seconds / span;
        if count >= 1 {
            let plural = if count == 1 { "" } else { "s" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "just now".to_string()
}

/// Render one ranked page as an HTML fragment. All record fields pass
/// through escaping; the highlight marks are the only trusted markup.
#[must_use]
pub fn render_results(results: &SearchResults, now: DateTime<Utc>) -> String {
    let query = html_escape::encode_text(&results.query);

    if results.results.is_empty() {
        return format!(
            "<div class=\"search-results\">\
             <div class=\"no-results\">No results found for \"{query}\"</div>\
             </div>"
        );
    }

    let mut out = format!(
        "<div class=\"search-results\">\
         <div class=\"search-results-header\">{} results for \"{query}\"</div>",
        results.total
    );

    for ranked in &results.results {
        let article = &ranked.article;
        let title = highlight_terms(article.display_title(), &results.query);
        let excerpt = highlight_terms(
            &truncate_text(article.excerpt(), EXCERPT_CHARS),
            &results.query,
        );
        let source = html_escape::encode_text(article.display_source());
        let link = html_escape::encode_double_quoted_attribute(&article.link);
        let id = html_escape::encode_double_quoted_attribute(&article.id);

        let date = article
            .pub_date
            .map_or_else(String::new, |d| format_time_ago(d, now));

        let badge = match ranked.content_type {
            crate::models::ContentType::Original => {
                "<span class=\"result-badge badge-original\">Original</span>"
            }
            crate::models::ContentType::Rss => "",
        };

        out.push_str(&format!(
            "<article class=\"search-result-item\" data-id=\"{id}\">\
             <h3 class=\"result-title\"><a href=\"{link}\">{title}</a></h3>\
             <div class=\"result-meta\">\
             <span class=\"result-source\">{source}</span>\
             <span class=\"result-date\">{date}</span>\
             <span class=\"result-read-time\">{} min read</span>\
             {badge}\
             </div>\
             <p class=\"result-excerpt\">{excerpt}</p>\
             </article>",
            article.read_time_minutes()
        ));
    }

    out.push_str("</div>");
    out
}
