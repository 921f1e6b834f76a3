//! Axum extractors for session and role gating.
//!
//! These read the [`Viewer`] that [`SessionLayer`](crate::SessionLayer)
//! stored in the request extensions.
//!
//! # Usage
//!
//! ```ignore
//! use vestry_axum::{roles, MaybeSession, RequireRole, RequireSession};
//!
//! // Redirects to /login without a session
//! async fn dashboard(viewer: RequireSession) -> String {
//!     format!("Welcome, {}", viewer.display_name())
//! }
//!
//! // Redirects to /unauthorized below leader
//! async fn groups(viewer: RequireRole<roles::Leader>) -> String {
//!     "Small groups".to_string()
//! }
//! ```

use std::marker::PhantomData;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use vestry_auth_core::AccessRequirement;
use vestry_types::Role;

use crate::context::Viewer;
use crate::error::GateRejection;

/// Extension key for the resolved viewer.
#[derive(Debug, Clone)]
pub struct ViewerExt(pub Viewer);

fn viewer_from(parts: &Parts) -> Option<Viewer> {
    parts.extensions.get::<ViewerExt>().map(|ext| ext.0.clone())
}

/// Extractor that requires a session.
///
/// Redirects to the login page when no session is present.
#[derive(Debug, Clone)]
pub struct RequireSession(pub Viewer);

impl Deref for RequireSession {
    type Target = Viewer;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        viewer_from(parts).map(Self).ok_or(GateRejection::Login)
    }
}

/// Extractor for an optional session.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Viewer>);

impl Deref for MaybeSession {
    type Target = Option<Viewer>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(viewer_from(parts)))
    }
}

/// Type-level minimum role for [`RequireRole`].
pub trait RoleBound: Send + Sync + 'static {
    const ROLE: Role;
}

/// Marker types for [`RequireRole`].
pub mod roles {
    use super::RoleBound;
    use vestry_types::Role;

    macro_rules! role_marker {
        ($($name:ident => $role:expr),* $(,)?) => {
            $(
                #[derive(Debug, Clone, Copy)]
                pub struct $name;

                impl RoleBound for $name {
                    const ROLE: Role = $role;
                }
            )*
        };
    }

    role_marker! {
        SystemAdmin => Role::SystemAdmin,
        ChurchAdmin => Role::ChurchAdmin,
        Leader => Role::Leader,
        Staff => Role::Staff,
        Member => Role::Member,
        Visitor => Role::Visitor,
    }
}

/// Extractor that requires at least role `R`.
///
/// Redirects to the login page without a session, and to the
/// unauthorized page when the viewer's role is below `R`. Church scoping
/// depends on request data, so handlers check it with [`Viewer::require`].
#[derive(Debug, Clone)]
pub struct RequireRole<R: RoleBound> {
    pub viewer: Viewer,
    _role: PhantomData<R>,
}

impl<R: RoleBound> RequireRole<R> {
    /// Check `viewer` against `R`.
    pub fn check(viewer: Viewer) -> Result<Self, GateRejection> {
        viewer.require(&AccessRequirement::role(R::ROLE))?;
        Ok(Self {
            viewer,
            _role: PhantomData,
        })
    }

    /// The role that was required.
    pub fn required(&self) -> Role {
        R::ROLE
    }
}

impl<R: RoleBound> Deref for RequireRole<R> {
    type Target = Viewer;

    fn deref(&self) -> &Self::Target {
        &self.viewer
    }
}

impl<S, R> FromRequestParts<S> for RequireRole<R>
where
    S: Send + Sync,
    R: RoleBound,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let viewer = viewer_from(parts).ok_or(GateRejection::Login)?;
        Self::check(viewer).inspect_err(|rejection| {
            tracing::debug!(required = %R::ROLE, %rejection, "Role requirement not met");
        })
    }
}
