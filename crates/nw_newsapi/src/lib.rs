//! NewsAPI client and ingest of its articles into an article store.

pub mod blocking;
pub mod client;
pub mod ingest;
pub mod types;

pub use client::{NewsApiClient, NewsApiConfig};
pub use ingest::{fetch_and_store, ingest, IngestReport};
pub use types::{EverythingResponse, NewsApiArticle, NewsApiSource};
