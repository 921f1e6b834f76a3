//! Configuration types for the auth core

use std::time::Duration;

use crate::cookie::GATE_COOKIE_MAX_AGE_SECS;
use crate::signer::GateTokenSigner;
use crate::AuthError;

/// Google's published signing keys for Firebase ID tokens
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Auth core configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Identity-provider project ID (token audience)
    pub project_id: String,
    /// Service account client email
    pub client_email: String,
    /// Service account private key (PEM)
    pub private_key: String,
    /// JWKS cache duration
    pub jwks_cache_duration: Duration,
    /// Gate cookie lifetime
    pub gate_max_age: Duration,
    /// Secret for signed gate tokens; presence-only gating when unset
    pub gate_secret: Option<String>,
    /// Override for the JWKS endpoint (tests, emulators)
    jwks_url_override: Option<String>,
}

impl AuthConfig {
    /// Create a validated auth config.
    ///
    /// Fails if any credential is missing. Literal `\n` sequences in the
    /// private key are unescaped, as environment files usually store it that way.
    pub fn try_new(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let project_id = project_id.into();
        let client_email = client_email.into();
        let private_key = private_key.into().replace("\\n", "\n");

        if project_id.trim().is_empty()
            || client_email.trim().is_empty()
            || private_key.trim().is_empty()
        {
            return Err(AuthError::Configuration(
                "identity provider credentials not properly configured".to_string(),
            ));
        }

        Ok(Self {
            project_id,
            client_email,
            private_key,
            jwks_cache_duration: Duration::from_secs(60 * 60),
            gate_max_age: Duration::from_secs(GATE_COOKIE_MAX_AGE_SECS),
            gate_secret: None,
            jwks_url_override: None,
        })
    }

    /// Expected `iss` claim of ID tokens
    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Get the JWKS URL
    pub fn jwks_url(&self) -> String {
        self.jwks_url_override
            .clone()
            .unwrap_or_else(|| FIREBASE_JWKS_URL.to_string())
    }

    /// Storage bucket derived from the project ID
    pub fn storage_bucket(&self) -> String {
        format!("{}.appspot.com", self.project_id)
    }

    /// Set JWKS cache duration
    pub fn with_jwks_cache_duration(mut self, duration: Duration) -> Self {
        self.jwks_cache_duration = duration;
        self
    }

    /// Point JWKS fetching at a different endpoint
    pub fn with_jwks_url_override(mut self, url: impl Into<String>) -> Self {
        self.jwks_url_override = Some(url.into());
        self
    }

    /// Enable signed gate tokens
    pub fn with_gate_secret(mut self, secret: impl Into<String>) -> Self {
        self.gate_secret = Some(secret.into());
        self
    }

    /// Set gate cookie lifetime
    pub fn with_gate_max_age(mut self, max_age: Duration) -> Self {
        self.gate_max_age = max_age;
        self
    }

    /// Build the gate token signer, if a secret is configured
    pub fn gate_signer(&self) -> Result<Option<GateTokenSigner>, AuthError> {
        self.gate_secret
            .as_ref()
            .map(|secret| GateTokenSigner::new(secret, self.gate_max_age.as_secs()))
            .transpose()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("jwks_cache_duration", &self.jwks_cache_duration)
            .field("gate_max_age", &self.gate_max_age)
            .field("gate_secret", &self.gate_secret.as_ref().map(|_| "[REDACTED]"))
            .field("jwks_url_override", &self.jwks_url_override)
            .finish()
    }
}
