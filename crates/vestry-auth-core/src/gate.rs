//! Client gate: role hierarchy and church scoping rules

use vestry_types::{ChurchId, Role};

use crate::mirror::MirrorSnapshot;

/// Login page path
pub const LOGIN_PATH: &str = "/login";

/// Access-denied page path
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// What protected content asks of the viewer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    /// Minimum role; `None` only requires a session
    pub role: Option<Role>,
    /// Church the viewer must belong to
    pub church_id: Option<ChurchId>,
}

impl AccessRequirement {
    /// Only require a session
    pub fn session() -> Self {
        Self::default()
    }

    /// Require at least `role`
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            church_id: None,
        }
    }

    /// Also require membership in `church_id`
    pub fn in_church(mut self, church_id: impl Into<ChurchId>) -> Self {
        self.church_id = Some(church_id.into());
        self
    }
}

/// Outcome of evaluating a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Session state is not resolved yet; show a placeholder
    Loading,
    /// Render the protected content
    Render,
    /// Send the viewer to the login page
    RedirectLogin,
    /// Send the viewer to the access-denied page
    RedirectUnauthorized,
}

impl GateDecision {
    /// Redirect location, if this decision redirects
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::RedirectLogin => Some(LOGIN_PATH),
            Self::RedirectUnauthorized => Some(UNAUTHORIZED_PATH),
            Self::Loading | Self::Render => None,
        }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Evaluates access requirements against mirrored session state
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientGate;

impl ClientGate {
    /// Decide whether to render, wait, or redirect.
    ///
    /// Rules, first match wins:
    /// 1. still initializing: [`GateDecision::Loading`]
    /// 2. no session: [`GateDecision::RedirectLogin`]
    /// 3. no required role: [`GateDecision::Render`]
    /// 4. `system_admin`: [`GateDecision::Render`], church ignored
    /// 5. required church differs from the profile's: [`GateDecision::RedirectUnauthorized`]
    /// 6. role below the required one: [`GateDecision::RedirectUnauthorized`]
    ///
    /// A session without a loaded profile is judged as a visitor.
    pub fn evaluate(snapshot: &MirrorSnapshot, requirement: &AccessRequirement) -> GateDecision {
        if snapshot.initializing {
            return GateDecision::Loading;
        }

        if snapshot.session.is_none() {
            return GateDecision::RedirectLogin;
        }

        let Some(required) = requirement.role else {
            return GateDecision::Render;
        };

        let role = snapshot.role().unwrap_or(Role::Visitor);
        if role.bypasses_tenant_scope() {
            return GateDecision::Render;
        }

        if let Some(church_id) = &requirement.church_id {
            let in_church = snapshot
                .profile
                .as_ref()
                .is_some_and(|p| p.in_church(church_id));
            if !in_church {
                tracing::debug!(church_id = %church_id, "Viewer outside required church");
                return GateDecision::RedirectUnauthorized;
            }
        }

        if !role.satisfies(required) {
            tracing::debug!(%role, %required, "Viewer role below requirement");
            return GateDecision::RedirectUnauthorized;
        }

        GateDecision::Render
    }
}
