use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(String),

    #[error("Access denied")]
    AccessDenied,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Api error: {0} - {1}")]
    Api(StatusCode, String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to serialize object: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("{0}")]
    Internal(String),
}

impl From<argon2::password_hash::Error> for ServerError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ServerError::Internal(format!("Password hashing failed: {}", e))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ServerError::AccessDenied => (StatusCode::FORBIDDEN, "Access denied".into()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServerError::Api(status, msg) => (status, msg),
            ServerError::Multipart(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ServerError::Storage(e) => {
                error!("Storage failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage failure".into())
            }
            ServerError::Database(e) => {
                error!("Database failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            ServerError::Serialize(e) => {
                error!("Serialization failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            ServerError::Internal(msg) => {
                error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
