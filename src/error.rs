//! Error types for Bibliotheca server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Machine-addressable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NoSuchData = 4,
    InsufficientCopies = 7,
    Duplicate = 8,
    QueueFailure = 9,
    MemberNotFound = 10,
    ActiveLoanNotFound = 11,
    DueDateAlreadyPassed = 12,
    BadValue = 18,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("No available copies")]
    InsufficientCopies,

    #[error("Member does not exist")]
    MemberNotFound,

    #[error("Active loan does not exist")]
    ActiveLoanNotFound,

    #[error("Due date has already passed")]
    DueDateAlreadyPassed,
}

impl AppError {
    /// Map a database error, turning constraint violations into conflicts
    pub fn from_db(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                return AppError::Conflict(format!("{} already exists", what));
            }
            if db.is_foreign_key_violation() {
                return AppError::Conflict(format!("{} is still referenced", what));
            }
        }
        AppError::Database(e)
    }

    fn parts(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::Queue(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::QueueFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
            AppError::InsufficientCopies => {
                (StatusCode::BAD_REQUEST, ErrorCode::InsufficientCopies)
            }
            AppError::MemberNotFound => (StatusCode::BAD_REQUEST, ErrorCode::MemberNotFound),
            AppError::ActiveLoanNotFound => {
                (StatusCode::BAD_REQUEST, ErrorCode::ActiveLoanNotFound)
            }
            AppError::DueDateAlreadyPassed => {
                (StatusCode::BAD_REQUEST, ErrorCode::DueDateAlreadyPassed)
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Queue(msg) => {
                tracing::error!("Queue error: {}", msg);
                "Queue error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
