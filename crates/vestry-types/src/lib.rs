//! Vestry Types - Shared domain types
//!
//! This crate contains domain types used across Vestry crates:
//! - Roles and the privilege hierarchy
//! - User identity, tenant (church) scoping and profiles
//! - Identity-provider sessions and gate-token claims

pub mod error;
pub mod role;
pub mod session;
pub mod user;

pub use error::*;
pub use role::*;
pub use session::*;
pub use user::*;
