use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const NEWS_API_FAILURE: &str = "Failed to fetch news from NewsAPI";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body did not match the article schema.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("NewsAPI is not configured")]
    NewsApiNotConfigured,

    #[error(transparent)]
    Core(#[from] nw_core::Error),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::Rejected { status, message } => (*status, message.clone()),
            ApiError::NewsApiNotConfigured => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::Core(nw_core::Error::NewsApi(_))
            | ApiError::Core(nw_core::Error::Http(_)) => {
                tracing::warn!("NewsAPI request failed: {}", self);
                (StatusCode::BAD_GATEWAY, NEWS_API_FAILURE.to_string())
            }
            ApiError::Core(nw_core::Error::Validation(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            ApiError::Core(_) | ApiError::Worker(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::NewsApiNotConfigured, StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Core(nw_core::Error::NewsApi("HTTP 401".into())), StatusCode::BAD_GATEWAY),
            (
                ApiError::Core(nw_core::Error::Database("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Rejected {
                    status: StatusCode::BAD_REQUEST,
                    message: "bad json".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
