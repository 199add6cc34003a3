use nw_core::{Article, ArticleStatus, ArticleStorage, Result};
use tracing::{info, warn};

use crate::client::NewsApiClient;
use crate::types::NewsApiArticle;

/// Per-status counts for one ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub fetched: usize,
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl IngestReport {
    pub(crate) fn new(fetched: usize) -> Self {
        Self {
            fetched,
            ..Default::default()
        }
    }

    /// Articles that reached the store, whatever the outcome.
    pub fn stored(&self) -> usize {
        self.new + self.updated + self.unchanged
    }

    pub fn message(&self) -> String {
        format!("{} news articles fetched and stored.", self.stored())
    }

    pub(crate) fn record(&mut self, article: &Article, status: ArticleStatus) {
        match status {
            ArticleStatus::New => self.new += 1,
            ArticleStatus::Updated => self.updated += 1,
            ArticleStatus::Unchanged => self.unchanged += 1,
        }
        info!("{} {} - {}", status.emoji(), article.title, article.url);
    }

    /// Converts a fetched item, counting it as skipped when it lacks a
    /// required field.
    pub(crate) fn accept(&mut self, item: NewsApiArticle) -> Option<Article> {
        let url = item.url.clone();
        match item.into_article() {
            Ok(article) => Some(article),
            Err(e) => {
                let url = url.as_deref().unwrap_or("<no url>");
                warn!("⚠️ Skipping NewsAPI article {}: {}", url, e);
                self.skipped += 1;
                None
            }
        }
    }
}

pub async fn ingest(
    storage: &dyn ArticleStorage,
    items: Vec<NewsApiArticle>,
) -> Result<IngestReport> {
    let mut report = IngestReport::new(items.len());
    for item in items {
        if let Some(article) = report.accept(item) {
            let status = storage.upsert_article(&article).await?;
            report.record(&article, status);
        }
    }
    Ok(report)
}

pub async fn fetch_and_store(
    client: &NewsApiClient,
    storage: &dyn ArticleStorage,
) -> Result<IngestReport> {
    let items = client.fetch_articles().await?;
    info!("📰 Fetched {} articles from NewsAPI", items.len());
    ingest(storage, items).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_storage::MemoryStorage;

    fn item(url: &str, title: &str) -> NewsApiArticle {
        NewsApiArticle {
            source: Some(crate::types::NewsApiSource {
                id: None,
                name: Some("Example".to_string()),
            }),
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            published_at: Some("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ingest_counts_statuses() {
        let storage = MemoryStorage::new();

        let items = vec![item("https://e.com/1", "One"), item("https://e.com/2", "Two")];
        let report = ingest(&storage, items).await.unwrap();
        assert_eq!(report.new, 2);
        assert_eq!(report.message(), "2 news articles fetched and stored.");

        let items = vec![item("https://e.com/1", "One"), item("https://e.com/2", "Two (edited)")];
        let report = ingest(&storage, items).await.unwrap();
        assert_eq!(
            report,
            IngestReport {
                fetched: 2,
                new: 0,
                updated: 1,
                unchanged: 1,
                skipped: 0,
            }
        );
        assert_eq!(ArticleStorage::list_articles(&storage).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_skips_incomplete_items() {
        let storage = MemoryStorage::new();
        let mut broken = item("https://e.com/3", "Three");
        broken.published_at = None;

        let report = ingest(&storage, vec![broken, item("https://e.com/4", "Four")]).await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.stored(), 1);
    }
}
