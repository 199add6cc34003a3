use async_trait::async_trait;
use nw_core::{
    Article, ArticleStatus, ArticleStorage, BlockingArticleStorage, Error, Result, StoredArticle,
};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<StoredArticle>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_article(&mut self, article: &Article) -> ArticleStatus {
        if let Some(existing) = self.articles.iter_mut().find(|a| a.article.url == article.url) {
            if existing.article == *article {
                return ArticleStatus::Unchanged;
            }
            existing.article = article.clone();
            ArticleStatus::Updated
        } else {
            self.articles.push(StoredArticle {
                id: Uuid::new_v4().to_string(),
                article: article.clone(),
            });
            ArticleStatus::New
        }
    }

    pub fn list_articles(&self) -> Vec<StoredArticle> {
        self.articles.clone()
    }
}

/// Process-local store, mostly useful for tests and demos.
///
/// Serves both the async and the blocking request paths; the lock is never
/// held across an await point.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert(&self, article: &Article) -> Result<ArticleStatus> {
        let mut store = self.store.write().map_err(|_| poisoned())?;
        Ok(store.upsert_article(article))
    }

    fn list(&self) -> Result<Vec<StoredArticle>> {
        let store = self.store.read().map_err(|_| poisoned())?;
        Ok(store.list_articles())
    }
}

fn poisoned() -> Error {
    Error::Storage("memory store lock poisoned".to_string())
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn upsert_article(&self, article: &Article) -> Result<ArticleStatus> {
        self.upsert(article)
    }

    async fn list_articles(&self) -> Result<Vec<StoredArticle>> {
        self.list()
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

impl BlockingArticleStorage for MemoryStorage {
    fn upsert_article(&self, article: &Article) -> Result<ArticleStatus> {
        self.upsert(article)
    }

    fn list_articles(&self) -> Result<Vec<StoredArticle>> {
        self.list()
    }

    fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(url: &str) -> Article {
        Article::new(
            "Test Article",
            url,
            "test",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_memory_storage_upsert_statuses() {
        let storage = MemoryStorage::new();
        let first = article("http://test.com");

        let status = ArticleStorage::upsert_article(&storage, &first).await.unwrap();
        assert_eq!(status, ArticleStatus::New);

        let status = ArticleStorage::upsert_article(&storage, &first).await.unwrap();
        assert_eq!(status, ArticleStatus::Unchanged);

        let mut changed = first.clone();
        changed.source = "other".to_string();
        let status = ArticleStorage::upsert_article(&storage, &changed).await.unwrap();
        assert_eq!(status, ArticleStatus::Updated);

        let stored = ArticleStorage::list_articles(&storage).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].article, changed);
    }

    #[tokio::test]
    async fn test_memory_storage_keeps_id_on_update() {
        let storage = MemoryStorage::new();
        let first = article("http://test.com");
        ArticleStorage::upsert_article(&storage, &first).await.unwrap();
        let id = ArticleStorage::list_articles(&storage).await.unwrap()[0].id.clone();

        let changed = first.with_description("now with a description");
        ArticleStorage::upsert_article(&storage, &changed).await.unwrap();

        let stored = ArticleStorage::list_articles(&storage).await.unwrap();
        assert_eq!(stored[0].id, id);
    }

    #[test]
    fn test_memory_storage_blocking_lists_distinct_urls() {
        let storage = MemoryStorage::new();
        for i in 0..3 {
            let url = format!("http://test.com/{}", i);
            let status = BlockingArticleStorage::upsert_article(&storage, &article(&url)).unwrap();
            assert_eq!(status, ArticleStatus::New);
        }

        let stored = BlockingArticleStorage::list_articles(&storage).unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|a| !a.id.is_empty()));
        assert_eq!(stored[2].article.url, "http://test.com/2");
    }

    #[tokio::test]
    async fn test_memory_storage_paths_share_state() {
        let storage = MemoryStorage::new();
        ArticleStorage::upsert_article(&storage, &article("http://test.com")).await.unwrap();

        let status =
            BlockingArticleStorage::upsert_article(&storage, &article("http://test.com")).unwrap();
        assert_eq!(status, ArticleStatus::Unchanged);
    }
}
