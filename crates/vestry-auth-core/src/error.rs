//! Auth errors

use thiserror::Error;

/// Authentication and session errors
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// No profile document exists for the session uid
    #[error("User data not found in database")]
    ProfileNotFound,

    /// Invalid token (malformed, bad signature, wrong audience, etc.)
    #[error("invalid token")]
    InvalidToken,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// Identity provider call failed
    #[error("identity provider error: {0}")]
    Provider(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidToken | Self::TokenExpired => 401,
            Self::ProfileNotFound => 404,
            Self::Provider(_) => 502,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<vestry_db::DbError> for AuthError {
    fn from(err: vestry_db::DbError) -> Self {
        match err {
            vestry_db::DbError::NotFound => Self::ProfileNotFound,
            other => {
                tracing::error!("Database error: {}", other);
                Self::Database(other.to_string())
            }
        }
    }
}
