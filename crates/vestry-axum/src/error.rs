//! Gate rejections.
//!
//! Denial is not an error condition here: every rejection renders as a
//! redirect, the same way the client gate would navigate.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use vestry_auth_core::{GateDecision, LOGIN_PATH, UNAUTHORIZED_PATH};

/// Why a request may not proceed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateRejection {
    /// No session; go to the login page.
    #[error("authentication required")]
    Login,

    /// Session present but role or church does not match.
    #[error("insufficient permissions")]
    Unauthorized,

    /// Viewer context could not be built.
    #[error("internal gate error: {0}")]
    Internal(String),
}

impl GateRejection {
    /// Map a non-render client-gate decision to a rejection.
    #[must_use]
    pub fn from_decision(decision: GateDecision) -> Self {
        match decision {
            GateDecision::RedirectLogin => Self::Login,
            GateDecision::RedirectUnauthorized => Self::Unauthorized,
            GateDecision::Loading | GateDecision::Render => {
                Self::Internal(format!("no rejection for {decision:?}"))
            }
        }
    }

    /// Redirect location for this rejection.
    pub fn location(&self) -> Option<&'static str> {
        match self {
            Self::Login => Some(LOGIN_PATH),
            Self::Unauthorized => Some(UNAUTHORIZED_PATH),
            Self::Internal(_) => None,
        }
    }
}

/// A `307 Temporary Redirect` to `location`.
pub fn redirect(location: &str) -> Response {
    (
        StatusCode::TEMPORARY_REDIRECT,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self.location() {
            Some(location) => redirect(location),
            None => {
                tracing::error!(error = %self, "Gate rejection without redirect");
                let body = serde_json::json!({
                    "error": {
                        "code": "INTERNAL_ERROR",
                        "message": "internal error",
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
