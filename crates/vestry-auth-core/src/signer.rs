//! Signed gate tokens
//!
//! A signed alternative to copying the raw ID token into the gate cookie.
//! With it, the edge check can verify signature and expiry instead of only
//! checking that the cookie exists.
//!
//! Format: `base64url(json(GateClaims)).base64url(hmac_sha256(payload))`

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use vestry_types::{GateClaims, Session, UserId};

use crate::crypto::HmacKey;
use crate::token::SessionVerifier;
use crate::AuthError;

/// Signs and verifies gate tokens
#[derive(Clone)]
pub struct GateTokenSigner {
    hmac_key: HmacKey,
    max_age_secs: u64,
}

impl GateTokenSigner {
    /// Create a signer.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the secret is shorter than 32 bytes.
    pub fn new(secret: impl AsRef<[u8]>, max_age_secs: u64) -> Result<Self, AuthError> {
        let hmac_key =
            HmacKey::new(secret).map_err(|e| AuthError::Configuration(e.to_string()))?;
        Ok(Self {
            hmac_key,
            max_age_secs,
        })
    }

    /// Issue a token for the given uid
    pub fn sign(&self, uid: &UserId) -> Result<String, AuthError> {
        self.sign_claims(&GateClaims::new(uid, self.max_age_secs))
    }

    /// Sign explicit claims
    pub fn sign_claims(&self, claims: &GateClaims) -> Result<String, AuthError> {
        let payload_json = serde_json::to_vec(claims).map_err(|e| {
            tracing::error!("Failed to serialize gate claims: {}", e);
            AuthError::Internal("Failed to sign gate token".to_string())
        })?;

        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);
        let signature = URL_SAFE_NO_PAD.encode(self.hmac_key.sign(payload_b64.as_bytes()));

        Ok(format!("{payload_b64}.{signature}"))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<GateClaims, AuthError> {
        let (payload_b64, signature) = token.rsplit_once('.').ok_or(AuthError::InvalidToken)?;

        let tag = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        if !self.hmac_key.verify(payload_b64.as_bytes(), &tag) {
            tracing::debug!("Gate token signature mismatch");
            return Err(AuthError::InvalidToken);
        }

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims: GateClaims =
            serde_json::from_slice(&payload_json).map_err(|_| AuthError::InvalidToken)?;

        if claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[async_trait]
impl SessionVerifier for GateTokenSigner {
    async fn verify_session(&self, token: &str) -> Result<Session, AuthError> {
        let claims = self.verify(token)?;
        Ok(Session {
            uid: claims.user_id(),
            email: None,
        })
    }
}

impl std::fmt::Debug for GateTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateTokenSigner")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}
