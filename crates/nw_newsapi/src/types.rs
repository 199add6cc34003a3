use nw_core::{parse_timestamp, Article, Error, Result};
use serde::Deserialize;

/// Body of a `/v2/everything` response. Only the article list is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EverythingResponse {
    pub status: Option<String>,
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsApiSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// An article as NewsAPI reports it; every field may be null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub source: Option<NewsApiSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl NewsApiArticle {
    pub fn into_article(self) -> Result<Article> {
        let url = require(self.url, "url")?;
        let title = require(self.title, "title")?;
        let source = require(self.source.and_then(|s| s.name), "source.name")?;
        let published_at = require(self.published_at, "publishedAt")?;

        Ok(Article {
            title,
            description: self.description,
            url,
            source,
            published_date: parse_timestamp(&published_at)?,
            author: self.author,
            url_to_image: self.url_to_image,
            content: self.content,
        })
    }
}

fn require(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| Error::Validation(format!("missing {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RESPONSE: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": "bbc-sport", "name": "BBC Sport"},
                "author": "BBC Sport",
                "title": "Cup final report",
                "description": "Match report",
                "url": "https://www.bbc.co.uk/sport/football/1",
                "urlToImage": "https://ichef.bbci.co.uk/1.jpg",
                "publishedAt": "2024-05-25T18:30:00Z",
                "content": "The final whistle..."
            },
            {
                "source": {"id": null, "name": "Removed"},
                "author": null,
                "title": "[Removed]",
                "description": null,
                "url": null,
                "urlToImage": null,
                "publishedAt": "1970-01-01T00:00:00Z",
                "content": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_everything_response() {
        let response: EverythingResponse = serde_json::from_str(RESPONSE).unwrap();
        assert_eq!(response.status.as_deref(), Some("ok"));
        assert_eq!(response.total_results, Some(2));
        assert_eq!(response.articles.len(), 2);
    }

    #[test]
    fn test_into_article_maps_fields() {
        let response: EverythingResponse = serde_json::from_str(RESPONSE).unwrap();
        let article = response.articles[0].clone().into_article().unwrap();

        assert_eq!(article.title, "Cup final report");
        assert_eq!(article.source, "BBC Sport");
        assert_eq!(article.url, "https://www.bbc.co.uk/sport/football/1");
        assert_eq!(article.url_to_image.as_deref(), Some("https://ichef.bbci.co.uk/1.jpg"));
        assert_eq!(article.published_date, Utc.with_ymd_and_hms(2024, 5, 25, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_into_article_requires_url() {
        let response: EverythingResponse = serde_json::from_str(RESPONSE).unwrap();
        let err = response.articles[1].clone().into_article().unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == "missing url"));
    }

    #[test]
    fn test_into_article_requires_source_name() {
        let item = NewsApiArticle {
            title: Some("t".to_string()),
            url: Some("http://x".to_string()),
            published_at: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert!(item.into_article().is_err());
    }
}
