//! Request viewer context.
//!
//! A [`Viewer`] is the request-time counterpart of the session mirror: the
//! session resolved from the request's credentials plus the matching profile.

use vestry_auth_core::{AccessRequirement, ClientGate, GateDecision, MirrorSnapshot};
use vestry_types::{ChurchId, Profile, Role, Session, UserId};

use crate::error::GateRejection;

/// Where the viewer's credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerSource {
    /// Gate cookie.
    GateCookie,
    /// `Authorization: Bearer` header.
    BearerToken,
}

/// Authenticated viewer of a request.
#[derive(Debug, Clone)]
pub struct Viewer {
    /// The verified session.
    pub session: Session,
    /// Profile for the session uid, if one exists.
    pub profile: Option<Profile>,
    /// Error from the profile lookup.
    pub profile_error: Option<String>,
    /// Credential source.
    pub source: ViewerSource,
}

impl Viewer {
    /// Create a viewer without a profile.
    #[must_use]
    pub fn new(session: Session, source: ViewerSource) -> Self {
        Self {
            session,
            profile: None,
            profile_error: None,
            source,
        }
    }

    /// Attach the viewer's profile.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Record a failed profile lookup.
    #[must_use]
    pub fn with_profile_error(mut self, error: impl Into<String>) -> Self {
        self.profile_error = Some(error.into());
        self
    }

    pub fn uid(&self) -> &UserId {
        &self.session.uid
    }

    /// Effective role; a viewer without a profile counts as a visitor.
    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.as_ref().map_or(Role::Visitor, |p| p.role)
    }

    pub fn church_id(&self) -> Option<&ChurchId> {
        self.profile.as_ref().and_then(|p| p.church_id.as_ref())
    }

    /// Name to greet the viewer with.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.profile {
            Some(profile) => profile.display_name(),
            None => self
                .session
                .email
                .clone()
                .unwrap_or_else(|| self.session.uid.to_string()),
        }
    }

    /// The viewer as a resolved mirror snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MirrorSnapshot {
        MirrorSnapshot {
            session: Some(self.session.clone()),
            profile: self.profile.clone(),
            initializing: false,
            error: self.profile_error.clone(),
        }
    }

    /// Check an access requirement with the client gate rules.
    pub fn require(&self, requirement: &AccessRequirement) -> Result<(), GateRejection> {
        match ClientGate::evaluate(&self.snapshot(), requirement) {
            GateDecision::Render => Ok(()),
            decision => Err(GateRejection::from_decision(decision)),
        }
    }
}
