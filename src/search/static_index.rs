use crate::constants::scoring::static_index as weights;
use crate::models::ArticleRecord;

/// Matches from the original-content list, scored and paginated.
#[derive(Debug, Clone, Default)]
pub struct StaticMatches {
    pub results: Vec<(ArticleRecord, f64)>,
    /// Match count before pagination (full list length for an empty query).
    pub total: usize,
}

/// Fixed index of site-authored articles. These never come from the remote
/// store; the list is small enough that substring scans are fine.
pub struct StaticIndex {
    entries: Vec<ArticleRecord>,
}

impl Default for StaticIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticIndex {
    #[must_use]
    pub fn new() -> Self {
        let entries = original_articles()
            .into_iter()
            .map(|v| serde_json::from_value(v).expect("static article entries are well-formed"))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substring search over the concatenated display fields.
    ///
    /// An empty query returns the list itself in declaration order with zero
    /// scores; `total` is always the pre-pagination match count.
    #[must_use]
    pub fn search(&self, terms: &str, offset: usize, limit: usize) -> StaticMatches {
        if terms.is_empty() {
            let results = self
                .entries
                .iter()
                .skip(offset)
                .take(limit)
                .map(|a| (a.clone(), 0.0))
                .collect();
            return StaticMatches {
                results,
                total: self.entries.len(),
            };
        }

        let terms = terms.to_lowercase();

        let mut scored: Vec<(ArticleRecord, f64)> = self
            .entries
            .iter()
            .filter(|article| {
                let haystack = [
                    article.title.as_str(),
                    article.description.as_str(),
                    article.content_snippet.as_str(),
                    article.source.as_str(),
                    article.author.as_str(),
                    article.category.as_str(),
                ]
                .join(" ")
                .to_lowercase();
                haystack.contains(&terms)
            })
            .map(|article| {
                let mut score = 0.0;
                if article.title.to_lowercase().contains(&terms) {
                    score += weights::TITLE_MATCH;
                }
                if article.description.to_lowercase().contains(&terms) {
                    score += weights::DESCRIPTION_MATCH;
                }
                if article.featured {
                    score += weights::FEATURED;
                }
                (article.clone(), score)
            })
            .collect();

        // Stable sort keeps declaration order among ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let total = scored.len();
        let results = scored.into_iter().skip(offset).take(limit).collect();

        StaticMatches { results, total }
    }
}

fn original_articles() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({
            "id": "top-10-ai-tools-2025",
            "title": "Top 10 AI Tools 2025: Best Artificial Intelligence Software for Professionals",
            "description": "Discover the top 10 AI tools dominating 2025. From ChatGPT Plus to Claude 3.5 Sonnet, Midjourney V6, and more - complete reviews, pricing, and use cases.",
            "content_snippet": "ChatGPT Plus, Claude 3.5 Sonnet, Midjourney V6, GitHub Copilot, Notion AI, Perplexity AI, Canva AI, Grammarly AI, Synthesia, RunwayML artificial intelligence software professional tools 2025",
            "link": "articles/top-10-ai-tools-2025.html",
            "source": "Newsdesk Original",
            "author": "Newsdesk Team",
            "pub_date": "2025-09-30T10:00:00Z",
            "category": "Tools",
            "word_count": 2847,
            "featured": true
        }),
        serde_json::json!({
            "id": "chatgpt-vs-claude-2025",
            "title": "ChatGPT vs Claude: Which AI Assistant Wins in 2025?",
            "description": "A hands-on comparison of ChatGPT and Claude across writing, coding, and research workflows, with pricing and real benchmark notes.",
            "content_snippet": "ChatGPT Claude comparison assistant writing coding research benchmarks pricing subscription context window",
            "link": "articles/chatgpt-vs-claude-2025.html",
            "source": "Newsdesk Original",
            "author": "Newsdesk Team",
            "pub_date": "2025-08-14T09:00:00Z",
            "category": "Tools",
            "word_count": 1980,
            "featured": true
        }),
        serde_json::json!({
            "id": "midjourney-v6-guide",
            "title": "Midjourney V6 Guide: Prompts, Styles, and Workflow Tips",
            "description": "Everything you need to get consistent results out of Midjourney V6, from prompt structure to style references.",
            "content_snippet": "Midjourney V6 prompts image generation style reference aspect ratio workflow tutorial",
            "link": "articles/midjourney-v6-guide.html",
            "source": "Newsdesk Original",
            "author": "Newsdesk Team",
            "pub_date": "2025-07-02T12:00:00Z",
            "category": "Tutorial",
            "word_count": 1540,
            "featured": false
        }),
        serde_json::json!({
            "id": "machine-learning-basics",
            "title": "Machine Learning Basics: A Plain-Language Introduction",
            "description": "What machine learning actually is, how models train, and where the common terms come from - no math degree required.",
            "content_snippet": "machine learning introduction training data models neural networks supervised unsupervised plain language",
            "link": "articles/machine-learning-basics.html",
            "source": "Newsdesk Original",
            "author": "Newsdesk Team",
            "pub_date": "2025-05-20T08:00:00Z",
            "category": "Tutorial",
            "word_count": 2210,
            "featured": false
        }),
        serde_json::json!({
            "id": "ai-automation-small-business",
            "title": "AI Automation for Small Business: Practical Starting Points",
            "description": "Five automation workflows a small team can set up in an afternoon, with the tools and costs for each.",
            "content_snippet": "automation small business workflows email scheduling invoicing AI tools cost",
            "link": "articles/ai-automation-small-business.html",
            "source": "Newsdesk Original",
            "author": "Newsdesk Team",
            "pub_date": "2025-04-11T10:30:00Z",
            "category": "Business",
            "word_count": 1320,
            "featured": false
        }),
        serde_json::json!({
            "id": "openai-gpt4-retrospective",
            "title": "GPT-4, Two Years On: What OpenAI Got Right and Wrong",
            "description": "A retrospective on GPT-4's launch predictions versus how the model family actually got used.",
            "content_snippet": "OpenAI GPT-4 retrospective launch predictions usage coding assistants API",
            "link": "articles/openai-gpt4-retrospective.html",
            "source": "Newsdesk Original",
            "author": "Newsdesk Team",
            "pub_date": "2025-03-03T14:00:00Z",
            "category": "News",
            "word_count": 1765,
            "featured": false
        }),
    ]
}
