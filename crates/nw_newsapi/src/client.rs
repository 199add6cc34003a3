use nw_core::{Error, Result};
use tracing::debug;

use crate::types::{EverythingResponse, NewsApiArticle};

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_QUERY: &str = "football";

pub(crate) const USER_AGENT: &str = concat!("nw/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct NewsApiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub query: String,
}

impl NewsApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            query: DEFAULT_QUERY.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub(crate) fn query_params(&self) -> [(&'static str, &str); 2] {
        [("q", self.query.as_str()), ("apiKey", self.api_key.as_str())]
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("query", &self.query)
            .finish()
    }
}

pub(crate) fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::NewsApi(format!("Failed to fetch news from NewsAPI: HTTP {}", status)))
    }
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    config: NewsApiConfig,
}

impl NewsApiClient {
    pub fn new(config: NewsApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &NewsApiConfig {
        &self.config
    }

    pub async fn fetch_articles(&self) -> Result<Vec<NewsApiArticle>> {
        debug!("Fetching {} (q={})", self.config.endpoint, self.config.query);
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&self.config.query_params())
            .send()
            .await?;
        check_status(response.status())?;

        let body: EverythingResponse = response.json().await?;
        Ok(body.articles)
    }
}
