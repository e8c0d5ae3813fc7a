//! Error handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::clients::FeedError;
use crate::db::StoreError;
use crate::services::answer::AnswerError;
use crate::services::ingest::IngestError;
use crate::services::matcher::MatchError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Missing credential or connection setting
    ConfigError(String),

    // Validation errors
    ValidationError(String),

    // Upstream feed errors, status passed through
    UpstreamError { status: u16, message: String },

    // Database errors
    DatabaseError(String),

    // Generic errors, logged with detail and answered with a fixed message
    InternalError { detail: String, message: &'static str },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ConfigError(msg) => {
                tracing::warn!("Configuration error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.as_str())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::UpstreamError { status, message } => {
                tracing::error!("Upstream error {}: {}", status, message);
                let status = StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, message.as_str())
            }
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            AppError::InternalError { detail, message } => {
                tracing::error!("Internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, *message)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::MissingApiKey => AppError::ConfigError(err.to_string()),
            FeedError::Upstream { status, message } => AppError::UpstreamError { status, message },
            FeedError::Network(_) => AppError::UpstreamError {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: err.to_string(),
            },
            FeedError::Parse(_) => AppError::UpstreamError {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: err.to_string(),
            },
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Feed(e) => e.into(),
            IngestError::Store(e) => e.into(),
        }
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::EmptyQuery => AppError::ValidationError(err.to_string()),
            MatchError::Store(e) => e.into(),
        }
    }
}

impl From<AnswerError> for AppError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::MissingApiKey => AppError::ConfigError(err.to_string()),
            AnswerError::Match(MatchError::EmptyQuery) => {
                AppError::ValidationError(MatchError::EmptyQuery.to_string())
            }
            AnswerError::Match(MatchError::Store(e)) => AppError::InternalError {
                detail: e.to_string(),
                message: "Something went wrong.",
            },
        }
    }
}
