use axum::{extract::rejection::JsonRejection, extract::State, Json};
use nw_core::{Article, StoredArticle};
use std::sync::Arc;
use tokio::task;
use tracing::debug;

use super::{validated, MessageResponse};
use crate::{ApiError, BlockingAppState};

pub async fn add_news(
    State(state): State<Arc<BlockingAppState>>,
    payload: Result<Json<Article>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let article = validated(payload)?;
    let storage = state.storage.clone();
    let (article, status) = task::spawn_blocking(move || {
        storage.upsert_article(&article).map(|status| (article, status))
    })
    .await??;
    debug!("{} {}", status.emoji(), article.url);
    Ok(Json(MessageResponse::for_status(status)))
}

pub async fn list_news(
    State(state): State<Arc<BlockingAppState>>,
) -> Result<Json<Vec<StoredArticle>>, ApiError> {
    let storage = state.storage.clone();
    let articles = task::spawn_blocking(move || storage.list_articles()).await??;
    Ok(Json(articles))
}

pub async fn fetch_news(
    State(state): State<Arc<BlockingAppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let config = state.news_api.clone().ok_or(ApiError::NewsApiNotConfigured)?;
    let storage = state.storage.clone();
    let report = task::spawn_blocking(move || {
        nw_newsapi::blocking::fetch_and_store(&config, storage.as_ref())
    })
    .await??;
    Ok(Json(MessageResponse::new(report.message())))
}
