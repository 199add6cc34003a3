use axum::{extract::rejection::JsonRejection, extract::State, Json};
use nw_core::{Article, StoredArticle};
use std::sync::Arc;
use tracing::debug;

use super::{validated, MessageResponse};
use crate::{ApiError, AppState};

pub async fn add_news(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Article>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let article = validated(payload)?;
    let status = state.storage.upsert_article(&article).await?;
    debug!("{} {}", status.emoji(), article.url);
    Ok(Json(MessageResponse::for_status(status)))
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredArticle>>, ApiError> {
    Ok(Json(state.storage.list_articles().await?))
}

pub async fn fetch_news(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let client = state.news_api.as_ref().ok_or(ApiError::NewsApiNotConfigured)?;
    let report = nw_newsapi::fetch_and_store(client, state.storage.as_ref()).await?;
    Ok(Json(MessageResponse::new(report.message())))
}
