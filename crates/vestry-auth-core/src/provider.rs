//! Identity provider seam
//!
//! The identity provider owns sessions. Vestry only subscribes to its
//! current-user signal and asks it for fresh ID tokens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use vestry_types::{Session, UserId};

use crate::AuthError;

/// External identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Subscribe to current-user changes.
    ///
    /// The receiver's initial value is the session at subscription time.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    /// Get an ID token for the session, optionally forcing a refresh.
    async fn id_token(&self, session: &Session, force_refresh: bool) -> Result<String, AuthError>;
}

/// Identity provider driven through a watch channel.
///
/// Used by local runs and tests to sign users in and out programmatically.
#[derive(Debug, Clone)]
pub struct ChannelIdentityProvider {
    sender: Arc<watch::Sender<Option<Session>>>,
    tokens: Arc<Mutex<HashMap<UserId, String>>>,
}

impl Default for ChannelIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelIdentityProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
            tokens: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sign a user in with the token the provider will hand out for them
    pub fn sign_in(&self, session: Session, token: impl Into<String>) {
        self.tokens_mut().insert(session.uid.clone(), token.into());
        self.sender.send_replace(Some(session));
    }

    /// Sign the current user out
    pub fn sign_out(&self) {
        if let Some(session) = self.sender.send_replace(None) {
            self.tokens_mut().remove(&session.uid);
        }
    }

    /// Currently signed-in session
    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    fn tokens_mut(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, String>> {
        self.tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for ChannelIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    async fn id_token(&self, session: &Session, _force_refresh: bool) -> Result<String, AuthError> {
        self.tokens_mut()
            .get(&session.uid)
            .cloned()
            .ok_or_else(|| AuthError::Provider(format!("no active session for {}", session.uid)))
    }
}
