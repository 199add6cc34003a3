//! Route handlers. `nonblocking` awaits the async store on the runtime's
//! workers; `blocking` moves each store call onto the blocking thread pool.
//! Both produce the same responses.

use axum::{extract::rejection::JsonRejection, Json};
use nw_core::{Article, ArticleStatus};
use serde::{Deserialize, Serialize};

use crate::ApiError;

pub mod blocking;
pub mod nonblocking;

pub const ADDED_MESSAGE: &str = "Article added/updated.";
pub const UNCHANGED_MESSAGE: &str = "No changes made (article already exists).";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn for_status(status: ArticleStatus) -> Self {
        if status.is_change() {
            Self::new(ADDED_MESSAGE)
        } else {
            Self::new(UNCHANGED_MESSAGE)
        }
    }
}

pub(crate) fn validated(
    payload: Result<Json<Article>, JsonRejection>,
) -> Result<Article, ApiError> {
    let Json(article) = payload?;
    Ok(article)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_for_status() {
        assert_eq!(MessageResponse::for_status(ArticleStatus::New).message, ADDED_MESSAGE);
        assert_eq!(MessageResponse::for_status(ArticleStatus::Updated).message, ADDED_MESSAGE);
        assert_eq!(
            MessageResponse::for_status(ArticleStatus::Unchanged).message,
            UNCHANGED_MESSAGE
        );
    }
}
