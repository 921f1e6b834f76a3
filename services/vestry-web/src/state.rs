//! Application state

use std::sync::Arc;
use std::time::Duration;

use vestry_auth_core::{
    EdgeGate, EdgeGateConfig, GateCookieConfig, GateTokenSigner, IdTokenVerifier, SessionVerifier,
};
use vestry_db::{DbPool, PgProfileRepository, ProfileRepository};

use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Verifies identity-provider ID tokens
    pub id_tokens: Arc<dyn SessionVerifier>,
    /// Signs gate tokens; the raw ID token is stored in the cookie when unset
    pub gate_signer: Option<GateTokenSigner>,
    /// Profile store
    pub profiles: Arc<dyn ProfileRepository>,
    /// Database pool for readiness checks
    pub pool: Option<DbPool>,
    /// Gate cookie attributes
    pub cookie: GateCookieConfig,
    /// Request timeout
    pub request_timeout: Duration,
}

impl AppState {
    /// Build state backed by PostgreSQL and the Firebase JWKS.
    pub fn from_config(config: &Config, pool: DbPool) -> Result<Self, vestry_auth_core::AuthError> {
        let gate_signer = config.auth.gate_signer()?;
        let cookie = GateCookieConfig::new()
            .max_age(config.auth.gate_max_age)
            .secure(config.cookie_secure);

        Ok(Self {
            id_tokens: Arc::new(IdTokenVerifier::new(config.auth.clone())),
            gate_signer,
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            pool: Some(pool),
            cookie,
            request_timeout: config.request_timeout,
        })
    }

    /// Build state from explicit parts, without a database pool.
    pub fn new(id_tokens: Arc<dyn SessionVerifier>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            id_tokens,
            gate_signer: None,
            profiles,
            pool: None,
            cookie: GateCookieConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Store signed gate tokens in the cookie instead of raw ID tokens
    #[must_use]
    pub fn with_gate_signer(mut self, signer: GateTokenSigner) -> Self {
        self.gate_signer = Some(signer);
        self
    }

    /// Verifier for the gate cookie value
    pub fn cookie_verifier(&self) -> Arc<dyn SessionVerifier> {
        match &self.gate_signer {
            Some(signer) => Arc::new(signer.clone()),
            None => Arc::clone(&self.id_tokens),
        }
    }

    /// Edge gate for navigation requests.
    ///
    /// Verifies the cookie signature when gate tokens are signed, and checks
    /// presence only otherwise.
    pub fn edge_gate(&self) -> EdgeGate {
        let gate = EdgeGate::new(EdgeGateConfig::default().with_cookie_name(self.cookie.name.clone()));
        match &self.gate_signer {
            Some(signer) => gate.with_verifier(signer.clone()),
            None => gate,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("signed_gate_tokens", &self.gate_signer.is_some())
            .field("cookie", &self.cookie)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
