use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};

use crate::api::response::FAILURE_MESSAGE;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required query parameter `url`")]
    MissingUrl,

    #[error("Failed to fetch data: {0}")]
    FetchError(String),

    #[error("Error parsing content: {0}")]
    ParseError(String),

    #[error("Selection failed: {0}")]
    SelectorError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Every error reaches the caller as the same fixed body with a 200 status.
/// The variant is only visible in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request failed");
        (StatusCode::OK, Json(FAILURE_MESSAGE)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_variant_renders_the_same_body() {
        let errors = vec![
            AppError::MissingUrl,
            AppError::FetchError("connection refused".into()),
            AppError::ParseError("application/pdf".into()),
            AppError::SelectorError("p".into()),
            AppError::ConfigError("bad port".into()),
        ];

        for err in errors {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert_eq!(&bytes[..], br#""Failed to load resource""#);
        }
    }
}
