use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A news article as accepted by the API and written to storage.
///
/// `url` is the natural key: a store holds at most one article per url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    #[serde(with = "timestamp")]
    pub published_date: DateTime<Utc>,
    pub author: Option<String>,
    pub url_to_image: Option<String>,
    pub content: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        published_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            url: url.into(),
            source: source.into(),
            published_date,
            author: None,
            url_to_image: None,
            content: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An article together with the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub article: Article,
}

/// Outcome of an upsert keyed on the article url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
    New,
    Updated,
    Unchanged,
}

impl ArticleStatus {
    /// True when the upsert wrote something.
    pub fn is_change(&self) -> bool {
        !matches!(self, ArticleStatus::Unchanged)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ArticleStatus::New => "🆕",
            ArticleStatus::Updated => "📝",
            ArticleStatus::Unchanged => "⏭️",
        }
    }
}

/// Parses a publish timestamp.
///
/// Accepts RFC 3339, a naive ISO datetime (taken as UTC) or a bare date
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Validation(format!("invalid published_date: {:?}", raw)))
}

pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::SecondsFormat;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
