use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::ai::AiError;

/// Summary of the wardrobe item an upload collided with.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DuplicateInfo {
    pub category: String,
    pub color: String,
    pub description: Option<String>,
}

/// Application-level error type for HTTP handlers.
///
/// Every variant renders as `{"error": "<message>"}` with the matching status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// No credentials, or credentials that do not match a user.
    #[error("{0}")]
    Unauthorized(String),

    /// A token was presented but is invalid or expired.
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness violation on user-supplied data.
    #[error("{0}")]
    Conflict(String),

    #[error("This image already exists in your wardrobe!")]
    DuplicateImage(DuplicateInfo),

    #[error("{0}")]
    NotFound(String),

    #[error("Your wardrobe is empty! Upload some clothing items first")]
    EmptyWardrobe,

    /// The AI service could not produce a reply; stored data is untouched.
    #[error("AI service is temporarily unavailable, please try again shortly")]
    AiUnavailable(#[from] AiError),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::DuplicateImage(_)
            | AppError::EmptyWardrobe => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AiUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unreadable or mistyped JSON bodies are a validation failure like any other.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::DuplicateImage(info) => json!({
                "error": self.to_string(),
                "duplicate": info,
            }),
            AppError::AiUnavailable(cause) => {
                tracing::error!(error = %cause, "ai service unavailable");
                json!({ "error": self.to_string() })
            }
            AppError::Persistence(err) => {
                tracing::error!(error = %err, "database error");
                json!({ "error": self.to_string() })
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                json!({ "error": "Server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::EmptyWardrobe.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Persistence(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn duplicate_body_carries_existing_item() {
        let err = AppError::DuplicateImage(DuplicateInfo {
            category: "Shirt".into(),
            color: "Blue".into(),
            description: None,
        });
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"], "This image already exists in your wardrobe!");
        assert_eq!(v["duplicate"]["category"], "Shirt");
    }

    #[tokio::test]
    async fn internal_errors_are_not_leaked() {
        let res = AppError::Internal(anyhow::anyhow!("secret stack detail")).into_response();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("secret stack detail"));
    }
}
