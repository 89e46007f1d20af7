use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use wv_db::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing credentials or unknown/inactive user
    #[error("{0}")]
    Auth(String),
    /// Token present but invalid or expired
    #[error("{0}")]
    InvalidToken(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upload(String),
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidToken(_) | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::Upload(_) | Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::DuplicateEmail(_)) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Jwt(_) | Self::Bcrypt(_) | Self::Io(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Store(StoreError::DuplicateEmail(_)) => "User already exists".to_string(),
            _ if status.is_server_error() => {
                tracing::error!("Request failed: {self}");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
