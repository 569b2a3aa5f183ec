use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::clients::{DateRange, SearchOptions, SortBy};
use crate::services::search::{AdvancedFilters, ReadingTime, SearchResults};

const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Named range: today, week, month, or quarter.
    pub date_range: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub sort: Option<String>,
    pub author: Option<String>,
    pub min_words: Option<u32>,
    pub max_words: Option<u32>,
    #[serde(default)]
    pub breaking_news: bool,
    #[serde(default)]
    pub featured_only: bool,
    pub reading_time: Option<String>,
    pub include_static: Option<bool>,
    pub include_rss: Option<bool>,
}

async fn run_search(
    state: &AppState,
    params: SearchParams,
) -> Result<SearchResults, ApiError> {
    let config = state.config().read().await.clone();

    let limit = params.limit.unwrap_or(config.search.default_limit);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let options = SearchOptions {
        limit,
        offset: params.offset.unwrap_or(0),
        date_range: params
            .date_range
            .as_deref()
            .and_then(|name| DateRange::named(name, Utc::now())),
        category: params.category,
        source: params.source,
        sort_by: params
            .sort
            .as_deref()
            .map_or(SortBy::Relevance, SortBy::from_param),
        include_static: params
            .include_static
            .unwrap_or(config.search.include_static),
        include_rss: params.include_rss.unwrap_or(true),
    };

    let filters = AdvancedFilters {
        min_words: params.min_words,
        max_words: params.max_words,
        author: params.author,
        breaking_news: params.breaking_news,
        featured_only: params.featured_only,
        reading_time: params
            .reading_time
            .as_deref()
            .and_then(ReadingTime::from_param),
    };

    Ok(state
        .search_service()
        .unified_search(&params.q, &options, &filters)
        .await)
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let results = run_search(&state, params).await?;
    Ok(Json(ApiResponse::success(results)))
}

/// Same search, rendered as an HTML fragment for direct embedding.
pub async fn search_fragment(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, ApiError> {
    let results = run_search(&state, params).await?;
    Ok(Html(crate::render::render_results(&results, Utc::now())))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let limit = {
        let config = state.config().read().await;
        params.limit.unwrap_or(config.search.suggestion_limit)
    };
    if limit > MAX_LIMIT {
        return Err(ApiError::validation(format!(
            "limit must be at most {MAX_LIMIT}"
        )));
    }

    let suggestions = state.suggest_service().suggest(&params.q, limit).await;
    Ok(Json(ApiResponse::success(suggestions)))
}
