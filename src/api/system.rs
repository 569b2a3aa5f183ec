use axum::{Json, extract::State};
use std::sync::Arc;

use crate::api::{ApiError, ApiResponse, AppState, SystemStatusDto};
use crate::config::Config;

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SystemStatusDto>> {
    let status = SystemStatusDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        cached_search_pages: state.search_service().cached_pages(),
        session_id: state.analytics().session_id().to_string(),
    };
    Json(ApiResponse::success(status))
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Config>> {
    let config = state.config().read().await.clone();
    Json(ApiResponse::success(config))
}

pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(new_config): Json<Config>,
) -> Result<Json<ApiResponse<Config>>, ApiError> {
    new_config
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    new_config.save_to_path(std::path::Path::new("config.toml"))?;

    let mut config = state.config().write().await;
    *config = new_config.clone();

    Ok(Json(ApiResponse::success(new_config)))
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ApiResponse<()>> {
    state.search_service().clear_cache();
    Json(ApiResponse::success(()))
}
