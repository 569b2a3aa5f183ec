/// Normalize a raw query for matching: punctuation becomes whitespace, runs
/// of whitespace collapse to single spaces, ends are trimmed.
///
/// Idempotent, so normalized queries are safe to use as cache-key material.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Query terms for highlight and heatmap use: lowercase words longer than
/// the given minimum.
#[must_use]
pub fn significant_terms(query: &str, min_len: usize) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.len() > min_len)
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_whitespace() {
        assert_eq!(normalize("  ChatGPT,   plus!? review  "), "ChatGPT plus review");
        assert_eq!(normalize("what's new"), "what s new");
        assert_eq!(normalize("GPT-4"), "GPT 4");
    }

    #[test]
    fn empty_in_empty_out() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn idempotent() {
        for q in ["  a  b ", "hello, world!", "AI tools 2025", "✨ claude ✨"] {
            let once = normalize(q);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn terms_drop_short_words() {
        assert_eq!(
            significant_terms("AI vs machine learning", 2),
            vec!["machine".to_string(), "learning".to_string()]
        );
    }
}
