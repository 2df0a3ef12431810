use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("not authorized, token missing or invalid")]
    Unauthorized,

    #[error("request timed out")]
    Timeout,

    #[error("request body is too large")]
    PayloadTooLarge,

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// Failure envelope shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorResponse {
    pub(crate) success: bool,
    pub(crate) error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation(_) | DomainError::AlreadyExists(_) => {
                    StatusCode::BAD_REQUEST
                }
                DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge,
            _ => AppError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::AppError;
    use crate::domain::error::DomainError;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn domain_errors_map_to_http_statuses() {
        assert_eq!(
            status_of(DomainError::validation("title", "is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::AlreadyExists("category".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DomainError::Forbidden("delete this post")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::NotFound("post".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Unexpected("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn transport_errors_map_to_http_statuses() {
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Timeout), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            status_of(anyhow::anyhow!("pool closed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
