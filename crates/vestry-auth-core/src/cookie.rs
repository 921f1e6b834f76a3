//! Gate cookie
//!
//! The gate cookie is a short-lived copy of the session token. Request-time
//! code cannot see in-memory session state, so it reads this cookie to infer
//! that a session exists.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Name of the gate cookie
pub const GATE_COOKIE_NAME: &str = "__firebase_auth_token";

/// Lifetime of the gate cookie in seconds
pub const GATE_COOKIE_MAX_AGE_SECS: u64 = 3600;

/// Expiry used to delete a cookie
pub const COOKIE_EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// `SameSite` attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

/// A single cookie write, rendered as a `Set-Cookie` value via `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: Option<u64>,
    pub expires: Option<&'static str>,
    pub same_site: Option<SameSite>,
    pub secure: bool,
    pub http_only: bool,
}

impl SetCookie {
    /// Whether this write deletes the cookie
    pub fn is_removal(&self) -> bool {
        self.value.is_empty() && (self.expires == Some(COOKIE_EPOCH) || self.max_age == Some(0))
    }
}

impl std::fmt::Display for SetCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if let Some(expires) = self.expires {
            write!(f, "; Expires={expires}")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={same_site}")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        Ok(())
    }
}

/// Gate cookie attributes
#[derive(Debug, Clone)]
pub struct GateCookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie path
    pub path: String,
    /// Lifetime
    pub max_age: Duration,
    /// SameSite policy
    pub same_site: SameSite,
    /// Add the `Secure` attribute
    pub secure: bool,
}

impl Default for GateCookieConfig {
    fn default() -> Self {
        Self {
            name: GATE_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            max_age: Duration::from_secs(GATE_COOKIE_MAX_AGE_SECS),
            same_site: SameSite::Strict,
            secure: false,
        }
    }
}

impl GateCookieConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the cookie lifetime
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set whether to add `Secure`
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Cookie write that stores `token`
    pub fn set(&self, token: impl Into<String>) -> SetCookie {
        SetCookie {
            name: self.name.clone(),
            value: token.into(),
            path: self.path.clone(),
            max_age: Some(self.max_age.as_secs()),
            expires: None,
            same_site: Some(self.same_site),
            secure: self.secure,
            http_only: false,
        }
    }

    /// Cookie write that deletes the gate cookie
    pub fn clear(&self) -> SetCookie {
        SetCookie {
            name: self.name.clone(),
            value: String::new(),
            path: self.path.clone(),
            max_age: None,
            expires: Some(COOKIE_EPOCH),
            same_site: None,
            secure: false,
            http_only: false,
        }
    }
}

/// Find a cookie value in a `Cookie` request header.
///
/// The first occurrence wins. Empty values are returned as `Some("")`.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Destination for gate cookie writes
pub trait CookieStore: Send + Sync + 'static {
    /// Apply a cookie write
    fn write(&self, cookie: &SetCookie);
}

/// In-memory cookie jar.
///
/// Stands in for a browser's cookie storage: it applies writes and can
/// render the `Cookie` header the next request would carry.
#[derive(Debug, Default, Clone)]
pub struct MemoryCookieJar {
    inner: Arc<Mutex<JarState>>,
}

#[derive(Debug, Default)]
struct JarState {
    cookies: BTreeMap<String, String>,
    writes: Vec<SetCookie>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a cookie
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().cookies.get(name).cloned()
    }

    /// Render the `Cookie` request header, or `None` when empty
    pub fn cookie_header(&self) -> Option<String> {
        let state = self.lock();
        if state.cookies.is_empty() {
            return None;
        }
        Some(
            state
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// All writes applied so far, oldest first
    pub fn writes(&self) -> Vec<SetCookie> {
        self.lock().writes.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JarState> {
        // A poisoned jar only means a writer panicked mid-insert; the map is still usable
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CookieStore for MemoryCookieJar {
    fn write(&self, cookie: &SetCookie) {
        let mut state = self.lock();
        if cookie.is_removal() {
            state.cookies.remove(&cookie.name);
        } else {
            state.cookies.insert(cookie.name.clone(), cookie.value.clone());
        }
        state.writes.push(cookie.clone());
    }
}
