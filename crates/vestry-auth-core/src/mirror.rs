//! Session mirror
//!
//! Mirrors the identity provider's current user and the matching profile
//! into an owned, observable snapshot, and keeps the gate cookie in step.
//!
//! Every session notification bumps a generation counter. Work started for
//! an older generation (token refresh, cookie write, profile fetch) is
//! discarded when it completes, so a slow fetch for a previous user can
//! never overwrite the current one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use vestry_db::ProfileRepository;
use vestry_types::{Profile, Role, Session};

use crate::cookie::{CookieStore, GateCookieConfig};
use crate::provider::IdentityProvider;
use crate::signer::GateTokenSigner;
use crate::AuthError;

/// Point-in-time view of the mirrored state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSnapshot {
    /// Current session, if signed in
    pub session: Option<Session>,
    /// Profile of the current session
    pub profile: Option<Profile>,
    /// True until the first notification has been processed
    pub initializing: bool,
    /// Last error message
    pub error: Option<String>,
}

impl Default for MirrorSnapshot {
    fn default() -> Self {
        Self {
            session: None,
            profile: None,
            initializing: true,
            error: None,
        }
    }
}

impl MirrorSnapshot {
    /// Snapshot of a resolved viewer (used by request-time code)
    pub fn resolved(session: Option<Session>, profile: Option<Profile>) -> Self {
        Self {
            session,
            profile,
            initializing: false,
            error: None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Role of the mirrored profile
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}

/// Session mirror options
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    /// Gate cookie attributes
    pub cookie: GateCookieConfig,
    /// Store a signed gate token instead of the raw ID token
    pub signer: Option<GateTokenSigner>,
}

impl MirrorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set gate cookie attributes
    pub fn with_cookie(mut self, cookie: GateCookieConfig) -> Self {
        self.cookie = cookie;
        self
    }

    /// Write signed gate tokens
    pub fn with_signer(mut self, signer: GateTokenSigner) -> Self {
        self.signer = Some(signer);
        self
    }
}

struct MirrorInner {
    state: watch::Sender<MirrorSnapshot>,
    generation: AtomicU64,
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
    cookies: Arc<dyn CookieStore>,
    options: MirrorOptions,
}

/// Owned session state for one client.
///
/// Created with [`SessionMirror::start`]; dropping it stops the
/// subscription.
pub struct SessionMirror {
    inner: Arc<MirrorInner>,
    task: JoinHandle<()>,
}

impl SessionMirror {
    /// Subscribe to the provider and start mirroring.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<P, R, C>(
        provider: Arc<P>,
        profiles: Arc<R>,
        cookies: Arc<C>,
        options: MirrorOptions,
    ) -> Self
    where
        P: IdentityProvider,
        R: ProfileRepository + 'static,
        C: CookieStore,
    {
        let (state, _) = watch::channel(MirrorSnapshot::default());
        let receiver = provider.subscribe();

        let inner = Arc::new(MirrorInner {
            state,
            generation: AtomicU64::new(0),
            provider,
            profiles,
            cookies,
            options,
        });

        let task = tokio::spawn(Arc::clone(&inner).run(receiver));

        Self { inner, task }
    }

    /// Current state
    pub fn snapshot(&self) -> MirrorSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Observe state changes
    pub fn watch(&self) -> watch::Receiver<MirrorSnapshot> {
        self.inner.state.subscribe()
    }

    /// Wait until the first notification has been processed
    pub async fn ready(&self) -> MirrorSnapshot {
        let mut rx = self.watch();
        // The sender lives in `inner`, which we hold, so this cannot close
        let ready = rx.wait_for(|s| !s.initializing).await.map(|s| s.clone());
        ready.unwrap_or_else(|_| self.snapshot())
    }

    /// Re-fetch the profile of the current session.
    ///
    /// Leaves the session and the gate cookie untouched. Without a session
    /// this does nothing.
    pub async fn refresh_profile(&self) -> MirrorSnapshot {
        let (session, generation) = {
            let state = self.inner.state.borrow();
            (
                state.session.clone(),
                self.inner.generation.load(Ordering::Acquire),
            )
        };

        if let Some(session) = session {
            self.inner.fetch_profile(&session, generation).await;
        }

        self.snapshot()
    }

    /// Stop mirroring
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for SessionMirror {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for SessionMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMirror")
            .field("state", &*self.inner.state.borrow())
            .field("generation", &self.inner.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl MirrorInner {
    async fn run(self: Arc<Self>, mut sessions: watch::Receiver<Option<Session>>) {
        let mut in_flight = JoinSet::new();

        let initial = sessions.borrow_and_update().clone();
        self.dispatch(initial, &mut in_flight);

        loop {
            tokio::select! {
                changed = sessions.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Identity provider closed its session channel");
                        break;
                    }
                    let session = sessions.borrow_and_update().clone();
                    self.dispatch(session, &mut in_flight);
                }
                Some(joined) = in_flight.join_next() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!("Session refresh task panicked: {}", e);
                        }
                    }
                }
            }
        }

        while in_flight.join_next().await.is_some() {}
    }

    /// Start handling one session notification
    fn dispatch(self: &Arc<Self>, session: Option<Session>, in_flight: &mut JoinSet<()>) {
        let mut generation = 0;

        match session {
            None => {
                self.state.send_modify(|state| {
                    generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
                    state.session = None;
                    state.profile = None;
                    state.error = None;
                    state.initializing = false;
                    self.cookies.write(&self.options.cookie.clear());
                });
                tracing::debug!(generation, "Session cleared");
            }
            Some(session) => {
                self.state.send_modify(|state| {
                    generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
                    let same_user = state
                        .session
                        .as_ref()
                        .is_some_and(|current| current.uid == session.uid);
                    if !same_user {
                        state.profile = None;
                    }
                    state.session = Some(session.clone());
                });
                tracing::debug!(generation, uid = %session.uid, "Session changed");

                let inner = Arc::clone(self);
                in_flight.spawn(async move { inner.sync_session(session, generation).await });
            }
        }
    }

    /// Refresh the token, write the gate cookie, then fetch the profile
    async fn sync_session(&self, session: Session, generation: u64) {
        let cookie_value = match self.gate_cookie_value(&session).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(uid = %session.uid, "Token refresh failed: {}", e);
                self.commit(generation, |state| {
                    state.error = Some(e.to_string());
                    state.initializing = false;
                });
                return;
            }
        };

        let cookie = self.options.cookie.set(cookie_value);
        let written = self.commit(generation, |_| self.cookies.write(&cookie));
        if !written {
            return;
        }

        self.fetch_profile(&session, generation).await;
    }

    async fn gate_cookie_value(&self, session: &Session) -> Result<String, AuthError> {
        let token = self.provider.id_token(session, true).await?;
        match &self.options.signer {
            Some(signer) => signer.sign(&session.uid),
            None => Ok(token),
        }
    }

    async fn fetch_profile(&self, session: &Session, generation: u64) {
        let result = self.profiles.find_by_uid(&session.uid).await;

        self.commit(generation, |state| {
            match result {
                Ok(Some(profile)) => {
                    state.profile = Some(profile);
                    state.error = None;
                }
                Ok(None) => {
                    tracing::warn!(uid = %session.uid, "Profile document does not exist");
                    state.error = Some(AuthError::ProfileNotFound.to_string());
                }
                Err(e) => {
                    tracing::error!(uid = %session.uid, "Error fetching profile: {}", e);
                    state.error = Some(e.to_string());
                }
            }
            state.initializing = false;
        });
    }

    /// Apply `update` only if `generation` is still current.
    ///
    /// The check and the update happen under the state lock, the same lock
    /// `dispatch` bumps the generation under.
    fn commit(&self, generation: u64, update: impl FnOnce(&mut MirrorSnapshot)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            update(state);
            applied = true;
            true
        });

        if !applied {
            tracing::debug!(generation, "Discarding stale session work");
        }
        applied
    }
}
