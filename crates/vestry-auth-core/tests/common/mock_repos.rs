//! Mock profile store and identity provider for mirror tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::watch;
use vestry_auth_core::{AuthError, IdentityProvider};
use vestry_db::{DbError, DbResult, MemoryProfileRepository, ProfileRepository};
use vestry_types::{ChurchId, Profile, ProfileUpdate, Role, Session, UserId};

/// Profile with predictable names for `uid`
pub fn test_profile(uid: &str, role: Role, church: Option<&str>) -> Profile {
    Profile {
        uid: UserId::new(uid),
        email: Some(format!("{uid}@example.org")),
        first_name: format!("First-{uid}"),
        last_name: format!("Last-{uid}"),
        role,
        church_id: church.map(ChurchId::new),
        phone: None,
        photo_url: None,
    }
}

/// Profile repository wrapper with per-uid latency and failure injection
#[derive(Default, Clone)]
pub struct MockProfileRepository {
    inner: MemoryProfileRepository,
    delays: Arc<DashMap<UserId, Duration>>,
    failing: Arc<AtomicBool>,
    lookups: Arc<AtomicUsize>,
}

impl MockProfileRepository {
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            inner: MemoryProfileRepository::with_profiles(profiles),
            ..Self::default()
        }
    }

    /// Delay lookups of `uid`
    #[allow(dead_code)]
    pub fn delay(&self, uid: &str, delay: Duration) {
        self.delays.insert(UserId::new(uid), delay);
    }

    /// Make every lookup fail with a database error
    #[allow(dead_code)]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `find_by_uid` calls so far
    #[allow(dead_code)]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Backing store, for out-of-band edits
    #[allow(dead_code)]
    pub fn store(&self) -> &MemoryProfileRepository {
        &self.inner
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn find_by_uid(&self, uid: &UserId) -> DbResult<Option<Profile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.get(uid).map(|d| *d.value());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Decode("connection reset by peer".to_string()));
        }
        self.inner.find_by_uid(uid).await
    }

    async fn list_by_church(&self, church_id: &ChurchId) -> DbResult<Vec<Profile>> {
        self.inner.list_by_church(church_id).await
    }

    async fn upsert(&self, profile: Profile) -> DbResult<Profile> {
        self.inner.upsert(profile).await
    }

    async fn update(&self, uid: &UserId, update: &ProfileUpdate) -> DbResult<Profile> {
        self.inner.update(uid, update).await
    }
}

/// Identity provider whose token refresh can fail
#[derive(Clone)]
pub struct FlakyIdentityProvider {
    sender: Arc<watch::Sender<Option<Session>>>,
    tokens: Arc<DashMap<UserId, String>>,
    refresh_fails: Arc<AtomicBool>,
}

impl FlakyIdentityProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
            tokens: Arc::new(DashMap::new()),
            refresh_fails: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn sign_in(&self, uid: &str, token: &str) {
        self.tokens.insert(UserId::new(uid), token.to_string());
        self.sender.send_replace(Some(Session::new(uid, None)));
    }

    #[allow(dead_code)]
    pub fn sign_out(&self) {
        self.sender.send_replace(None);
    }

    #[allow(dead_code)]
    pub fn set_refresh_fails(&self, fails: bool) {
        self.refresh_fails.store(fails, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn tokens(&self) -> HashMap<UserId, String> {
        self.tokens
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }
}

#[async_trait]
impl IdentityProvider for FlakyIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    async fn id_token(&self, session: &Session, _force_refresh: bool) -> Result<String, AuthError> {
        if self.refresh_fails.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("network request failed".to_string()));
        }
        self.tokens
            .get(&session.uid)
            .map(|t| t.value().clone())
            .ok_or_else(|| AuthError::Provider("user token unavailable".to_string()))
    }
}
