use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{ApiError, ApiResponse, AppState, ProfileDto};
use crate::services::analytics::{AnalyticsDashboard, AnalyticsSummary};

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<AnalyticsSummary>> {
    Json(ApiResponse::success(state.analytics().summary()))
}

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<AnalyticsDashboard>> {
    Json(ApiResponse::success(state.analytics().dashboard()))
}

pub async fn get_profile(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ProfileDto>> {
    let profiles = state.profiles();
    Json(ApiResponse::success(ProfileDto {
        profile: profiles.snapshot(),
        recent_searches: profiles.recent_searches(),
        popular_searches: profiles.popular_searches(),
    }))
}

pub async fn clear_profile(State(state): State<Arc<AppState>>) -> Json<ApiResponse<()>> {
    state.profiles().clear();
    Json(ApiResponse::success(()))
}

#[derive(Debug, Deserialize)]
pub struct PreferredSourceBody {
    pub source: String,
}

pub async fn add_preferred_source(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PreferredSourceBody>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if body.source.trim().is_empty() {
        return Err(ApiError::validation("source must not be empty"));
    }
    state.profiles().mark_preferred_source(body.source.trim());
    Ok(Json(ApiResponse::success(())))
}
