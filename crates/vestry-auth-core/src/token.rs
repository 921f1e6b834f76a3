//! ID token verification with JWKS caching

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use vestry_types::Session;

use crate::{AuthConfig, AuthError};

/// Turns a bearer or cookie token into a session
#[async_trait]
pub trait SessionVerifier: Send + Sync + 'static {
    async fn verify_session(&self, token: &str) -> Result<Session, AuthError>;
}

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// Individual JWK (JSON Web Key)
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    pub alg: Option<String>,
    pub n: String,
    pub e: String,
}

/// Claims carried by an identity-provider ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// Subject (provider uid)
    pub sub: String,
    /// Audience (project ID)
    pub aud: String,
    /// Issuer
    pub iss: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Time the user authenticated
    pub auth_time: Option<i64>,
    /// Email
    pub email: Option<String>,
    /// Email verified
    pub email_verified: Option<bool>,
}

impl FirebaseClaims {
    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Convert into a session handle
    pub fn into_session(self) -> Session {
        Session::new(self.sub, self.email)
    }
}

const JWKS_CACHE_KEY: &str = "jwks";

/// ID token verifier with JWKS caching
///
/// Unknown key IDs are rejected without a refetch once the key set is cached.
#[derive(Clone)]
pub struct IdTokenVerifier {
    config: AuthConfig,
    http_client: reqwest::Client,
    /// kid -> DecodingKey
    key_cache: Cache<String, Arc<DecodingKey>>,
    /// Single entry: kids of the last fetched key set
    jwks_kids_cache: Cache<String, Arc<Vec<String>>>,
}

impl IdTokenVerifier {
    pub fn new(config: AuthConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(2)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(config, http_client)
    }

    /// Create a verifier with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: reqwest::Client) -> Self {
        let cache_duration = config.jwks_cache_duration;
        Self {
            config,
            http_client,
            key_cache: Cache::builder()
                .time_to_live(cache_duration)
                .max_capacity(100)
                .build(),
            jwks_kids_cache: Cache::builder()
                .time_to_live(cache_duration)
                .max_capacity(1)
                .build(),
        }
    }

    /// Verify an ID token and return its claims.
    ///
    /// Checks the RS256 signature against the provider's published keys,
    /// then issuer, audience, expiry and a non-empty subject.
    pub async fn verify(&self, token: &str) -> Result<FirebaseClaims, AuthError> {
        let kid = decode_header(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Undecodable ID token header");
                AuthError::InvalidToken
            })?
            .kid
            .ok_or(AuthError::InvalidToken)?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[self.config.project_id.as_str()]);

        let claims = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, %kid, "ID token rejected");
                    AuthError::InvalidToken
                }
            })?
            .claims;

        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        if claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Key for `kid`, refreshing the key set at most once per cache period
    async fn decoding_key(&self, kid: &str) -> Result<Arc<DecodingKey>, AuthError> {
        if let Some(key) = self.key_cache.get(kid).await {
            return Ok(key);
        }

        // Unknown kids never trigger a refetch while the key set is cached
        if let Some(known) = self.jwks_kids_cache.get(JWKS_CACHE_KEY).await {
            if !known.iter().any(|k| k == kid) {
                tracing::debug!(%kid, known = known.len(), "Unknown key id");
                return Err(AuthError::InvalidToken);
            }
        }

        self.refresh_keys().await?;

        self.key_cache.get(kid).await.ok_or_else(|| {
            tracing::debug!(%kid, "Key id missing from fresh key set");
            AuthError::InvalidToken
        })
    }

    /// Fetch the key set and replace the cached keys
    async fn refresh_keys(&self) -> Result<(), AuthError> {
        let jwks = self.fetch_jwks().await?;

        let mut kids = Vec::with_capacity(jwks.keys.len());
        for jwk in &jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    self.key_cache.insert(jwk.kid.clone(), Arc::new(key)).await;
                }
                Err(e) => tracing::warn!(kid = %jwk.kid, error = %e, "Skipping unusable JWK"),
            }
            kids.push(jwk.kid.clone());
        }

        tracing::debug!(keys = kids.len(), "Key set refreshed");
        self.jwks_kids_cache
            .insert(JWKS_CACHE_KEY.to_string(), Arc::new(kids))
            .await;
        Ok(())
    }

    async fn fetch_jwks(&self) -> Result<Jwks, AuthError> {
        let url = self.config.jwks_url();

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::error!(%url, error = %e, "Key set request failed");
                AuthError::Provider("failed to fetch signing keys".to_string())
            })?;

        response.json::<Jwks>().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Key set response unreadable");
            AuthError::Provider("failed to parse signing keys".to_string())
        })
    }

    /// Drop cached keys so the next verification refetches
    pub async fn invalidate_cache(&self) {
        self.key_cache.invalidate_all();
        self.jwks_kids_cache.invalidate_all();
    }
}

#[async_trait]
impl SessionVerifier for IdTokenVerifier {
    async fn verify_session(&self, token: &str) -> Result<Session, AuthError> {
        self.verify(token).await.map(FirebaseClaims::into_session)
    }
}

impl std::fmt::Debug for IdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
