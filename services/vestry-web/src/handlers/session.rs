//! Gate cookie exchange
//!
//! `POST /api/session` trades a verified ID token for the gate cookie, which
//! is the server-side counterpart of the session mirror's cookie write.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use vestry_auth_core::SessionVerifier;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// Identity-provider ID token
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub uid: String,
    pub email: Option<String>,
    /// Whether the cookie holds a signed gate token
    pub signed: bool,
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/session
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let token = req.token.trim();
    if token.is_empty() {
        return Err(ApiError::BadRequest("token is required".to_string()));
    }

    let session = state
        .id_tokens
        .verify_session(token)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "Rejected ID token"))?;

    let cookie_value = match &state.gate_signer {
        Some(signer) => signer.sign(&session.uid)?,
        None => token.to_string(),
    };
    let cookie = state.cookie.set(cookie_value);

    metrics::counter!("vestry_sessions_created_total").increment(1);
    tracing::info!(uid = %session.uid, signed = state.gate_signer.is_some(), "Gate cookie issued");

    let response = SessionResponse {
        uid: session.uid.to_string(),
        email: session.email,
        signed: state.gate_signer.is_some(),
    };

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(response),
    ))
}

/// DELETE /api/session
pub async fn delete_session(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.cookie.clear().to_string())],
        Json(SignOutResponse { success: true }),
    )
}
