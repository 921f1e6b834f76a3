//! Error types for the Vestry web service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vestry_axum::GateRejection;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Identity provider unavailable")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error")]
    Database(#[from] vestry_db::DbError),

    /// Access denied; rendered as a redirect
    #[error(transparent)]
    Gate(#[from] GateRejection),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidToken | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Database(vestry_db::DbError::NotFound) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Database(_) | Self::Gate(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ProfileNotFound | Self::Database(vestry_db::DbError::NotFound) => {
                "PROFILE_NOT_FOUND"
            }
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::Internal(_) | Self::Database(_) | Self::Gate(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<vestry_auth_core::AuthError> for ApiError {
    fn from(err: vestry_auth_core::AuthError) -> Self {
        use vestry_auth_core::AuthError;

        match err {
            AuthError::ProfileNotFound => Self::ProfileNotFound,
            AuthError::InvalidToken => Self::InvalidToken,
            AuthError::TokenExpired => Self::TokenExpired,
            AuthError::Provider(msg) => Self::Provider(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<vestry_types::VestryError> for ApiError {
    fn from(err: vestry_types::VestryError) -> Self {
        use vestry_types::VestryError;

        match err {
            VestryError::InvalidInput(msg) | VestryError::InvalidRole(msg) => Self::BadRequest(msg),
            VestryError::ProfileNotFound(_) => Self::ProfileNotFound,
            VestryError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let this = match self {
            Self::Gate(rejection) => return rejection.into_response(),
            other => other,
        };

        let status = this.status_code();
        let code = this.error_code();

        // Log internal errors
        if status.is_server_error() {
            tracing::error!(error = ?this, "Internal API error");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: this.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
