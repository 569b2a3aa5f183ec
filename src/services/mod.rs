pub mod analytics;
pub mod profile;
pub mod search;
pub mod suggest;

pub use analytics::AnalyticsService;
pub use profile::ProfileStore;
pub use search::SearchService;
pub use suggest::SuggestService;
