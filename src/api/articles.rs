use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::{ApiError, ApiResponse, AppState};
use crate::models::ArticleRecord;

const TOP_STORY_COUNT: usize = 3;

#[derive(Debug, Deserialize)]
pub struct LatestParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LatestArticles {
    pub articles: Vec<ArticleRecord>,
    pub top_stories: Vec<ArticleRecord>,
}

/// Featured records lead the top-stories strip. When nothing is flagged
/// the highest trending scores stand in.
fn split_top_stories(articles: &[ArticleRecord]) -> Vec<ArticleRecord> {
    let mut featured: Vec<ArticleRecord> = articles
        .iter()
        .filter(|article| article.featured)
        .take(TOP_STORY_COUNT)
        .cloned()
        .collect();

    if featured.is_empty() {
        featured = articles.to_vec();
        featured.sort_by(|a, b| {
            b.trending_score
                .partial_cmp(&a.trending_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        featured.truncate(TOP_STORY_COUNT);
    }

    featured
}

pub async fn latest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LatestParams>,
) -> Result<Json<ApiResponse<LatestArticles>>, ApiError> {
    let limit = {
        let config = state.config().read().await;
        params.limit.unwrap_or(config.search.default_limit)
    };

    let articles = state.search_service().latest(limit).await?;
    let top_stories = split_top_stories(&articles);
    Ok(Json(ApiResponse::success(LatestArticles {
        articles,
        top_stories,
    })))
}
