use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::{ArticleStore, HttpArticleStore};
use crate::config::Config;
use crate::services::{AnalyticsService, ProfileStore, SearchService, SuggestService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Newsdesk/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Arc<dyn ArticleStore>,

    pub profiles: Arc<ProfileStore>,

    pub analytics: Arc<AnalyticsService>,

    pub search_service: Arc<SearchService>,

    pub suggest_service: Arc<SuggestService>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.store.request_timeout_seconds.into())?;
        let store: Arc<dyn ArticleStore> = Arc::new(HttpArticleStore::new(
            http_client,
            config.store.base_url.clone(),
            config.store.api_key.clone(),
        ));
        Self::with_store(config, store)
    }

    /// Wire the service graph around any store implementation. Tests inject
    /// scripted stores through here.
    pub fn with_store(config: Config, store: Arc<dyn ArticleStore>) -> anyhow::Result<Self> {
        let profiles = Arc::new(ProfileStore::open(&config.general.data_path)?);
        let analytics = Arc::new(AnalyticsService::new(Arc::clone(&profiles)));

        let search_service = Arc::new(SearchService::new(
            Arc::clone(&store),
            Arc::clone(&profiles),
            Arc::clone(&analytics),
        ));

        let suggest_service = Arc::new(SuggestService::new(
            Arc::clone(&store),
            Arc::clone(&profiles),
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            profiles,
            analytics,
            search_service,
            suggest_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
