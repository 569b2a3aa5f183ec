use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_WORD_COUNT, READING_WPM};

/// One content item, fetched from the remote article store or taken from the
/// fixed original-content list.
///
/// The store's spreadsheet-era rows carry booleans as `true`, `"TRUE"`,
/// `"true"` or `1` depending on the ingestion path; all of that is normalized
/// into plain `bool` here so scoring never sees the source-format ambiguity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default, deserialize_with = "flex::string_like")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub content_snippet: String,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub author: String,

    #[serde(default, deserialize_with = "flex::lenient_date")]
    pub pub_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub category: String,

    #[serde(default, deserialize_with = "flex::lenient_u32")]
    pub word_count: u32,

    #[serde(default, deserialize_with = "flex::lenient_bool")]
    pub featured: bool,

    #[serde(default, deserialize_with = "flex::lenient_bool")]
    pub breaking_news: bool,

    #[serde(default, deserialize_with = "flex::lenient_bool")]
    pub is_top_story: bool,

    #[serde(default, deserialize_with = "flex::lenient_f64")]
    pub trending_score: f64,
}

impl ArticleRecord {
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "No title available"
        } else {
            &self.title
        }
    }

    #[must_use]
    pub fn display_source(&self) -> &str {
        if self.source.is_empty() {
            "Unknown source"
        } else {
            &self.source
        }
    }

    /// Description, falling back to the content snippet.
    #[must_use]
    pub fn excerpt(&self) -> &str {
        if !self.description.is_empty() {
            &self.description
        } else if !self.content_snippet.is_empty() {
            &self.content_snippet
        } else {
            "No summary available"
        }
    }

    #[must_use]
    pub fn read_time_minutes(&self) -> u32 {
        let words = if self.word_count == 0 {
            FALLBACK_WORD_COUNT
        } else {
            self.word_count
        };
        words.div_ceil(READING_WPM).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Rss,
    Original,
}

/// An article annotated with its computed relevance and provenance tag.
#[derive(Debug, Clone, Serialize)]
pub struct RankedArticle {
    #[serde(flatten)]
    pub article: ArticleRecord,
    pub content_type: ContentType,
    pub relevance_score: f64,
}

impl RankedArticle {
    /// Score used when ordering merged results: originals get a flat bonus so
    /// site-authored content wins ties against wire content.
    #[must_use]
    pub fn boosted_score(&self) -> f64 {
        match self.content_type {
            ContentType::Original => {
                self.relevance_score + crate::constants::scoring::ORIGINAL_BONUS
            }
            ContentType::Rss => self.relevance_score,
        }
    }
}

mod flex {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn lenient_bool<'de, D>(de: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(de)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1" || s.eq_ignore_ascii_case("yes")
            }
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            _ => false,
        })
    }

    pub fn lenient_u32<'de, D>(de: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(de)?;
        Ok(match value {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
                .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX)),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    pub fn lenient_f64<'de, D>(de: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(de)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        })
    }

    pub fn string_like<'de, D>(de: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(de)?;
        Ok(match value {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    }

    /// Unparseable dates become `None` rather than failing the whole record;
    /// scoring simply skips the recency boost for them.
    pub fn lenient_date<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(de)?;
        Ok(match value {
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .ok(),
            _ => None,
        })
    }
}
