//! Vestry Auth Core - Session mirroring and access gating
//!
//! Core gating functionality:
//! - [`SessionMirror`]: mirrors identity-provider session state and the
//!   matching profile, and keeps the gate cookie in sync
//! - [`EdgeGate`]: request-time cookie check with login redirects
//! - [`ClientGate`]: role hierarchy and church scoping rules
//! - [`IdTokenVerifier`] and [`GateTokenSigner`]: server-side token checks

pub mod config;
pub mod cookie;
pub mod crypto;
pub mod edge;
pub mod error;
pub mod gate;
pub mod mirror;
pub mod provider;
pub mod signer;
pub mod token;

pub use config::AuthConfig;
pub use cookie::{
    cookie_value, CookieStore, GateCookieConfig, MemoryCookieJar, SameSite, SetCookie,
    GATE_COOKIE_MAX_AGE_SECS, GATE_COOKIE_NAME,
};
pub use crypto::{HmacKey, HmacKeyError};
pub use edge::{EdgeDecision, EdgeGate, EdgeGateConfig};
pub use error::AuthError;
pub use gate::{AccessRequirement, ClientGate, GateDecision, LOGIN_PATH, UNAUTHORIZED_PATH};
pub use mirror::{MirrorOptions, MirrorSnapshot, SessionMirror};
pub use provider::{ChannelIdentityProvider, IdentityProvider};
pub use signer::GateTokenSigner;
pub use token::{FirebaseClaims, IdTokenVerifier, SessionVerifier};
