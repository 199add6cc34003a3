//! Blocking counterparts of the client and ingest functions.
//!
//! These block the calling thread on HTTP and storage I/O. Inside a tokio
//! runtime, call them from `spawn_blocking`.

use nw_core::{BlockingArticleStorage, Result};
use tracing::info;

use crate::client::{check_status, NewsApiConfig, USER_AGENT};
use crate::ingest::IngestReport;
use crate::types::{EverythingResponse, NewsApiArticle};

pub fn fetch_articles(config: &NewsApiConfig) -> Result<Vec<NewsApiArticle>> {
    let http = reqwest::blocking::Client::builder().user_agent(USER_AGENT).build()?;
    let response = http
        .get(&config.endpoint)
        .query(&config.query_params())
        .send()?;
    check_status(response.status())?;

    let body: EverythingResponse = response.json()?;
    Ok(body.articles)
}

pub fn ingest(
    storage: &dyn BlockingArticleStorage,
    items: Vec<NewsApiArticle>,
) -> Result<IngestReport> {
    let mut report = IngestReport::new(items.len());
    for item in items {
        if let Some(article) = report.accept(item) {
            let status = storage.upsert_article(&article)?;
            report.record(&article, status);
        }
    }
    Ok(report)
}

pub fn fetch_and_store(
    config: &NewsApiConfig,
    storage: &dyn BlockingArticleStorage,
) -> Result<IngestReport> {
    let items = fetch_articles(config)?;
    info!("📰 Fetched {} articles from NewsAPI", items.len());
    ingest(storage, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_core::Error;
    use nw_storage::MemoryStorage;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blocking_fetch_and_store() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "football"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "articles": [
                    {
                        "source": {"name": "Example"},
                        "title": "One",
                        "url": "https://example.com/1",
                        "publishedAt": "2024-01-01T00:00:00Z"
                    },
                    {
                        "source": {"name": "Example"},
                        "title": null,
                        "url": "https://example.com/2",
                        "publishedAt": "2024-01-01T00:00:00Z"
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let config = NewsApiConfig::new("test-key").with_endpoint(mock_server.uri());
        let storage = MemoryStorage::new();
        let worker_storage = storage.clone();

        let report = tokio::task::spawn_blocking(move || fetch_and_store(&config, &worker_storage))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.new, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(BlockingArticleStorage::list_articles(&storage).unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blocking_fetch_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let config = NewsApiConfig::new("test-key").with_endpoint(mock_server.uri());
        let result = tokio::task::spawn_blocking(move || fetch_articles(&config)).await.unwrap();
        assert!(matches!(result, Err(Error::NewsApi(_))));
    }
}
