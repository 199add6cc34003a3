use nw_core::{ArticleStorage, BlockingArticleStorage, Result};
use std::fmt;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

pub const DEFAULT_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "news_db";
pub const DEFAULT_COLLECTION: &str = "articles";

/// Where a backend keeps its articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    Memory,
    Mongodb,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Mongodb => write!(f, "mongodb"),
        }
    }
}

/// Builds a store for the async request path. Only the client is built here;
/// reachability is checked by the caller through `ping` and `prepare`.
pub async fn create_storage(
    kind: BackendKind,
    config: &StoreConfig,
) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        BackendKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        #[cfg(feature = "mongodb")]
        BackendKind::Mongodb => Ok(Arc::new(MongoStorage::connect(config).await?)),
        #[cfg(not(feature = "mongodb"))]
        BackendKind::Mongodb => Err(backend_disabled(config)),
    }
}

/// Builds a store for the blocking request path.
///
/// The sync MongoDB client drives its own runtime, so this must not be called
/// from inside an async task.
pub fn create_blocking_storage(
    kind: BackendKind,
    config: &StoreConfig,
) -> Result<Arc<dyn BlockingArticleStorage>> {
    match kind {
        BackendKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        #[cfg(feature = "mongodb")]
        BackendKind::Mongodb => Ok(Arc::new(MongoBlockingStorage::connect(config)?)),
        #[cfg(not(feature = "mongodb"))]
        BackendKind::Mongodb => Err(backend_disabled(config)),
    }
}

#[cfg(not(feature = "mongodb"))]
fn backend_disabled(config: &StoreConfig) -> nw_core::Error {
    nw_core::Error::Storage(format!(
        "cannot use {}: built without the `mongodb` feature",
        config.url
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.url, "mongodb://localhost:27017");
        assert_eq!(config.database, "news_db");
        assert_eq!(config.collection, "articles");
    }

    #[test]
    fn test_config_builders() {
        let config = StoreConfig::default()
            .with_url("mongodb://db:27017")
            .with_database("test_db")
            .with_collection("test_articles");
        assert_eq!(config.url, "mongodb://db:27017");
        assert_eq!(config.database, "test_db");
        assert_eq!(config.collection, "test_articles");
    }

    #[cfg(feature = "mongodb")]
    #[tokio::test]
    async fn test_create_mongodb_storage_without_server() {
        let config = StoreConfig::default()
            .with_url("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=300");

        let storage = create_storage(BackendKind::Mongodb, &config).await.unwrap();
        assert!(storage.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage(BackendKind::Memory, &StoreConfig::default()).await.unwrap();
        storage.ping().await.unwrap();
        assert!(storage.list_articles().await.unwrap().is_empty());
    }

    #[test]
    fn test_create_blocking_memory_storage() {
        let storage =
            create_blocking_storage(BackendKind::Memory, &StoreConfig::default()).unwrap();
        storage.ping().unwrap();
        assert!(storage.list_articles().unwrap().is_empty());
    }
}
