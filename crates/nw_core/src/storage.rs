use async_trait::async_trait;
use crate::types::{Article, ArticleStatus, StoredArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Insert the article, or replace the stored one with the same url
    async fn upsert_article(&self, article: &Article) -> Result<ArticleStatus>;

    /// Get every stored article
    async fn list_articles(&self) -> Result<Vec<StoredArticle>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Create indexes and anything else the backend needs before serving.
    /// Safe to call more than once.
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }
}

/// Same contract as [`ArticleStorage`], for callers that run on a thread of
/// their own and block on every call.
pub trait BlockingArticleStorage: Send + Sync {
    fn upsert_article(&self, article: &Article) -> Result<ArticleStatus>;

    fn list_articles(&self) -> Result<Vec<StoredArticle>>;

    fn ping(&self) -> Result<()>;

    fn prepare(&self) -> Result<()> {
        Ok(())
    }
}
