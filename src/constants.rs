pub mod cache {
    use std::time::Duration;

    pub const SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

    pub const SEARCH_CAPACITY: usize = 256;
}

pub mod limits {

    pub const DEFAULT_SEARCH_LIMIT: usize = 20;

    pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

    pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

    pub const RECENT_SEARCHES: usize = 20;

    pub const POPULAR_SEARCHES: usize = 50;

    /// History is truncated to the newest half once it crosses this.
    pub const SEARCH_HISTORY_HIGH_WATER: usize = 100;

    pub const SEARCH_HISTORY_KEEP: usize = 50;

    pub const PREFERRED_SOURCES: usize = 10;

    pub const ANALYTICS_EVENTS: usize = 1000;

    pub const PERF_SAMPLES_HIGH_WATER: usize = 500;

    pub const PERF_SAMPLES_KEEP: usize = 250;

    pub const ERROR_LOG_ENTRIES: usize = 50;

    pub const HEATMAP_CONTEXTS: usize = 10;
}

pub mod scoring {

    pub const TITLE_MATCH: f64 = 15.0;

    pub const DESCRIPTION_MATCH: f64 = 10.0;

    pub const CONTENT_MATCH: f64 = 5.0;

    pub const FEATURED: f64 = 5.0;

    pub const BREAKING_NEWS: f64 = 3.0;

    pub const TOP_STORY: f64 = 3.0;

    pub const RECENT_WEEK: f64 = 3.0;

    pub const RECENT_DAY: f64 = 2.0;

    pub const LONG_FORM: f64 = 2.0;

    pub const LONG_FORM_WORDS: u32 = 1000;

    /// Flat bonus applied to site-original entries when merging, so originals
    /// outrank wire content at equal relevance.
    pub const ORIGINAL_BONUS: f64 = 2.0;

    pub const INTEREST_WEIGHT: f64 = 0.1;

    pub const PREFERRED_SOURCE_BONUS: f64 = 2.0;

    pub mod static_index {

        pub const TITLE_MATCH: f64 = 10.0;

        pub const DESCRIPTION_MATCH: f64 = 5.0;

        pub const FEATURED: f64 = 3.0;
    }
}

pub mod retry {
    use std::time::Duration;

    pub const LATEST_ATTEMPTS: u32 = 3;

    pub const LATEST_BASE_DELAY: Duration = Duration::from_millis(500);

    pub const LATEST_MAX_DELAY: Duration = Duration::from_secs(5);
}

pub mod intervals {
    use std::time::Duration;

    pub const ANALYTICS_FLUSH: Duration = Duration::from_secs(30);
}

/// Words-per-minute figure used for read-time estimates.
pub const READING_WPM: u32 = 200;

/// Word count assumed when a record does not carry one.
pub const FALLBACK_WORD_COUNT: u32 = 300;
