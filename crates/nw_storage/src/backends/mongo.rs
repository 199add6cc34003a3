use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::IndexOptions;
use mongodb::{sync, Client, Collection, Database, IndexModel};
use nw_core::{
    Article, ArticleStatus, ArticleStorage, BlockingArticleStorage, Error, Result, StoredArticle,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::StoreConfig;

/// Article as laid out in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ArticleDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    description: Option<String>,
    url: String,
    source: String,
    published_date: BsonDateTime,
    author: Option<String>,
    url_to_image: Option<String>,
    content: Option<String>,
}

impl ArticleDocument {
    fn into_stored(self) -> Result<StoredArticle> {
        let millis = self.published_date.timestamp_millis();
        let published_date = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            Error::Database(format!("Article {} has an out of range published_date", self.url))
        })?;

        Ok(StoredArticle {
            id: self.id.to_hex(),
            article: Article {
                title: self.title,
                description: self.description,
                url: self.url,
                source: self.source,
                published_date,
                author: self.author,
                url_to_image: self.url_to_image,
                content: self.content,
            },
        })
    }
}

/// Decode one raw document, skipping (with a warning) documents that do not
/// follow the article layout, e.g. ones written by older clients.
fn decode_article(document: Document) -> Option<StoredArticle> {
    let id = document
        .get_object_id("_id")
        .map(|id| id.to_hex())
        .unwrap_or_else(|_| "without an ObjectId".to_string());

    let stored = bson::from_document::<ArticleDocument>(document)
        .map_err(|e| Error::Database(format!("Unreadable article document: {}", e)))
        .and_then(ArticleDocument::into_stored);

    match stored {
        Ok(stored) => Some(stored),
        Err(e) => {
            warn!("⚠️ Skipping article {}: {}", id, e);
            None
        }
    }
}

fn url_filter(article: &Article) -> Document {
    doc! { "url": article.url.as_str() }
}

/// `$set` payload replacing every article field.
fn set_document(article: &Article) -> Document {
    doc! {
        "$set": {
            "title": article.title.as_str(),
            "description": article.description.clone(),
            "url": article.url.as_str(),
            "source": article.source.as_str(),
            "published_date":
                BsonDateTime::from_millis(article.published_date.timestamp_millis()),
            "author": article.author.clone(),
            "url_to_image": article.url_to_image.clone(),
            "content": article.content.clone(),
        }
    }
}

fn url_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "url": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn upsert_status(upserted: bool, modified_count: u64) -> ArticleStatus {
    if upserted {
        ArticleStatus::New
    } else if modified_count > 0 {
        ArticleStatus::Updated
    } else {
        ArticleStatus::Unchanged
    }
}

fn database_error(context: &str, err: mongodb::error::Error) -> Error {
    Error::Database(format!("{}: {}", context, err))
}

pub struct MongoStorage {
    database: Database,
    collection: Collection<Document>,
}

impl MongoStorage {
    /// Build the client. Does not contact the server; the driver connects
    /// lazily, so an unreachable server surfaces in `ping` and `prepare`.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(|e| database_error("Failed to create MongoDB client", e))?;
        let database = client.database(&config.database);
        let collection = database.collection::<Document>(&config.collection);

        Ok(Self { database, collection })
    }
}

#[async_trait]
impl ArticleStorage for MongoStorage {
    async fn upsert_article(&self, article: &Article) -> Result<ArticleStatus> {
        let result = self
            .collection
            .update_one(url_filter(article), set_document(article))
            .upsert(true)
            .await
            .map_err(|e| database_error("Failed to upsert article", e))?;

        Ok(upsert_status(result.upserted_id.is_some(), result.modified_count))
    }

    async fn list_articles(&self) -> Result<Vec<StoredArticle>> {
        let documents: Vec<Document> = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| database_error("Failed to query articles", e))?
            .try_collect()
            .await
            .map_err(|e| database_error("Failed to read articles", e))?;

        Ok(documents.into_iter().filter_map(decode_article).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| database_error("MongoDB ping failed", e))?;
        Ok(())
    }

    async fn prepare(&self) -> Result<()> {
        self.collection
            .create_index(url_index())
            .await
            .map_err(|e| database_error("Failed to create url index", e))?;
        info!("🍃 MongoDB collection {} is ready", self.collection.namespace());
        Ok(())
    }
}

/// Same collection layout as [`MongoStorage`], through the driver's sync API.
pub struct MongoBlockingStorage {
    database: sync::Database,
    collection: sync::Collection<Document>,
}

impl MongoBlockingStorage {
    /// Build the client without contacting the server, like
    /// [`MongoStorage::connect`].
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let client = sync::Client::with_uri_str(&config.url)
            .map_err(|e| database_error("Failed to create MongoDB client", e))?;
        let database = client.database(&config.database);
        let collection = database.collection::<Document>(&config.collection);

        Ok(Self { database, collection })
    }
}

impl BlockingArticleStorage for MongoBlockingStorage {
    fn upsert_article(&self, article: &Article) -> Result<ArticleStatus> {
        let result = self
            .collection
            .update_one(url_filter(article), set_document(article))
            .upsert(true)
            .run()
            .map_err(|e| database_error("Failed to upsert article", e))?;

        Ok(upsert_status(result.upserted_id.is_some(), result.modified_count))
    }

    fn list_articles(&self) -> Result<Vec<StoredArticle>> {
        let cursor = self
            .collection
            .find(doc! {})
            .run()
            .map_err(|e| database_error("Failed to query articles", e))?;

        let mut articles = Vec::new();
        for document in cursor {
            let document = document.map_err(|e| database_error("Failed to read articles", e))?;
            articles.extend(decode_article(document));
        }
        Ok(articles)
    }

    fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(|e| database_error("MongoDB ping failed", e))?;
        Ok(())
    }

    fn prepare(&self) -> Result<()> {
        self.collection
            .create_index(url_index())
            .run()
            .map_err(|e| database_error("Failed to create url index", e))?;
        info!("🍃 MongoDB collection {} is ready (blocking)", self.collection.namespace());
        Ok(())
    }
}
