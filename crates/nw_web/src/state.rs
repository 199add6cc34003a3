use std::sync::Arc;
use nw_core::{ArticleStorage, BlockingArticleStorage};
use nw_newsapi::{NewsApiClient, NewsApiConfig};

/// Shared state of the non-blocking router.
pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    pub news_api: Option<NewsApiClient>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self { storage, news_api: None }
    }

    pub fn with_news_api(mut self, client: NewsApiClient) -> Self {
        self.news_api = Some(client);
        self
    }
}

/// Shared state of the blocking router. The NewsAPI client is built per
/// request on the worker thread, so only its config is kept.
pub struct BlockingAppState {
    pub storage: Arc<dyn BlockingArticleStorage>,
    pub news_api: Option<NewsApiConfig>,
}

impl BlockingAppState {
    pub fn new(storage: Arc<dyn BlockingArticleStorage>) -> Self {
        Self { storage, news_api: None }
    }

    pub fn with_news_api(mut self, config: NewsApiConfig) -> Self {
        self.news_api = Some(config);
        self
    }
}
