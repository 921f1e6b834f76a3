//! Edge gate
//!
//! Request-time navigation check. It has no access to the session mirror,
//! only to the request path and its cookies. In the default mode it is a
//! presence check on the gate cookie: a coarse filter, not a security
//! boundary. With a [`GateTokenSigner`] it verifies the signed gate token
//! instead.

use crate::cookie::{cookie_value, GATE_COOKIE_NAME};
use crate::gate::LOGIN_PATH;
use crate::signer::GateTokenSigner;

/// Edge gate configuration
#[derive(Debug, Clone)]
pub struct EdgeGateConfig {
    /// Path prefixes that always pass
    pub public_prefixes: Vec<String>,
    /// Login page path
    pub login_path: String,
    /// Gate cookie name
    pub cookie_name: String,
}

impl Default for EdgeGateConfig {
    fn default() -> Self {
        Self {
            public_prefixes: ["/login", "/_next", "/api", "/static"]
                .into_iter()
                .map(String::from)
                .collect(),
            login_path: LOGIN_PATH.to_string(),
            cookie_name: GATE_COOKIE_NAME.to_string(),
        }
    }
}

impl EdgeGateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a public path prefix
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefixes.push(prefix.into());
        self
    }

    /// Set the login path
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set the gate cookie name
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }
}

/// Result of an edge check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Let the request through
    Pass,
    /// Redirect to this location
    Redirect(String),
}

impl EdgeDecision {
    /// Label used for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Redirect(_) => "redirect",
        }
    }
}

/// Stateless per-request gate
#[derive(Debug, Clone, Default)]
pub struct EdgeGate {
    config: EdgeGateConfig,
    verifier: Option<GateTokenSigner>,
}

impl EdgeGate {
    pub fn new(config: EdgeGateConfig) -> Self {
        Self {
            config,
            verifier: None,
        }
    }

    /// Verify signed gate tokens instead of checking presence
    pub fn with_verifier(mut self, signer: GateTokenSigner) -> Self {
        self.verifier = Some(signer);
        self
    }

    /// Whether gate tokens are verified
    pub fn is_verified(&self) -> bool {
        self.verifier.is_some()
    }

    pub fn config(&self) -> &EdgeGateConfig {
        &self.config
    }

    /// Decide whether a navigation to `path` may proceed.
    ///
    /// `cookie_header` is the raw `Cookie` request header, if any.
    pub fn check(&self, path: &str, cookie_header: Option<&str>) -> EdgeDecision {
        if self.is_public(path) {
            return EdgeDecision::Pass;
        }

        if !self.has_session(cookie_header) && path != self.config.login_path {
            return EdgeDecision::Redirect(self.login_redirect(path));
        }

        EdgeDecision::Pass
    }

    /// Whether `path` is on the public allow-list
    pub fn is_public(&self, path: &str) -> bool {
        self.config
            .public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Login location carrying the original path in `from`
    pub fn login_redirect(&self, from: &str) -> String {
        format!(
            "{}?from={}",
            self.config.login_path,
            urlencoding::encode(from)
        )
    }

    fn has_session(&self, cookie_header: Option<&str>) -> bool {
        let Some(token) = cookie_header
            .and_then(|header| cookie_value(header, &self.config.cookie_name))
            .filter(|token| !token.is_empty())
        else {
            return false;
        };

        match &self.verifier {
            None => true,
            Some(signer) => match signer.verify(token) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!("Rejected gate token: {}", e);
                    false
                }
            },
        }
    }
}
