//! Common error types

use thiserror::Error;

/// Common errors across Vestry
#[derive(Error, Debug)]
pub enum VestryError {
    /// Profile not found
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// Invalid role
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Invalid caller-supplied input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<crate::RoleParseError> for VestryError {
    fn from(err: crate::RoleParseError) -> Self {
        Self::InvalidRole(err.0)
    }
}
