use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod analytics;
mod articles;
mod error;
mod observability;
mod search;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::state::SharedState;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn search_service(&self) -> &Arc<crate::services::SearchService> {
        &self.shared.search_service
    }

    #[must_use]
    pub fn suggest_service(&self) -> &Arc<crate::services::SuggestService> {
        &self.shared.suggest_service
    }

    #[must_use]
    pub fn analytics(&self) -> &Arc<crate::services::AnalyticsService> {
        &self.shared.analytics
    }

    #[must_use]
    pub fn profiles(&self) -> &Arc<crate::services::ProfileStore> {
        &self.shared.profiles
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config)?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .route("/search", get(search::search))
        .route("/search/fragment", get(search::search_fragment))
        .route("/search/suggestions", get(search::suggestions))
        .route("/articles/latest", get(articles::latest))
        .route("/analytics/summary", get(analytics::get_summary))
        .route("/analytics/dashboard", get(analytics::get_dashboard))
        .route("/profile", get(analytics::get_profile))
        .route("/profile", delete(analytics::clear_profile))
        .route(
            "/profile/preferred-sources",
            post(analytics::add_preferred_source),
        )
        .route("/system/status", get(system::get_status))
        .route("/system/config", get(system::get_config))
        .route("/system/config", put(system::update_config))
        .route("/system/cache/clear", post(system::clear_cache))
        .with_state(Arc::clone(&state));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route(
            "/metrics",
            get(observability::get_metrics).with_state(state),
        )
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
