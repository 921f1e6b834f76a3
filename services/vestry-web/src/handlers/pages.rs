//! Page handlers.
//!
//! Pages answer with JSON view models; the edge gate and the extractors
//! decide whether a page may be shown at all.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use vestry_auth_core::{AccessRequirement, LOGIN_PATH};
use vestry_axum::{roles, MaybeSession, RequireRole, RequireSession};
use vestry_db::ProfileRepository;
use vestry_types::{ChurchId, Profile, Role};

use crate::error::ApiResult;
use crate::state::AppState;

/// Where to land after login when no `from` is given
const HOME_PATH: &str = "/dashboard";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    pub page: &'static str,
    pub signed_in: bool,
    /// Local path to return to after signing in
    pub redirect_to: String,
}

#[derive(Debug, Serialize)]
pub struct UnauthorizedPage {
    pub page: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPage {
    pub page: &'static str,
    pub greeting: String,
    pub role: Role,
    pub church_id: Option<ChurchId>,
    pub profile_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PeopleQuery {
    /// Case-insensitive match on name or email
    pub q: Option<String>,
    /// Church to list; only honoured for system admins
    pub church_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeoplePage {
    pub page: &'static str,
    pub church_id: ChurchId,
    pub total: usize,
    pub people: Vec<Profile>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
///
/// Send signed-in viewers to the dashboard and everyone else to login
pub async fn index(MaybeSession(viewer): MaybeSession) -> Redirect {
    match viewer {
        Some(_) => Redirect::temporary(HOME_PATH),
        None => Redirect::temporary(LOGIN_PATH),
    }
}

/// GET /login
pub async fn login(
    MaybeSession(viewer): MaybeSession,
    Query(query): Query<LoginQuery>,
) -> Json<LoginPage> {
    Json(LoginPage {
        page: "login",
        signed_in: viewer.is_some(),
        redirect_to: return_path(query.from.as_deref()),
    })
}

/// GET /unauthorized
pub async fn unauthorized() -> Json<UnauthorizedPage> {
    Json(UnauthorizedPage {
        page: "unauthorized",
        message: "You do not have permission to view this page",
    })
}

/// GET /dashboard
pub async fn dashboard(viewer: RequireSession) -> Json<DashboardPage> {
    Json(DashboardPage {
        page: "dashboard",
        greeting: format!("Welcome back, {}", viewer.display_name()),
        role: viewer.role(),
        church_id: viewer.church_id().cloned(),
        profile_error: viewer.profile_error.clone(),
    })
}

/// GET /people
///
/// Members of the viewer's church. System admins may list any church.
pub async fn people(
    State(state): State<AppState>,
    viewer: RequireRole<roles::Staff>,
    Query(query): Query<PeopleQuery>,
) -> ApiResult<Json<PeoplePage>> {
    let requested = query
        .church_id
        .filter(|id| !id.trim().is_empty())
        .map(ChurchId::new);

    let church_id = match (requested, viewer.church_id()) {
        (Some(requested), _) => requested,
        (None, Some(own)) => own.clone(),
        (None, None) => {
            return Err(vestry_axum::GateRejection::Unauthorized.into());
        }
    };

    viewer.require(&AccessRequirement::role(Role::Staff).in_church(church_id.clone()))?;

    let needle = query
        .q
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let people: Vec<Profile> = state
        .profiles
        .list_by_church(&church_id)
        .await?
        .into_iter()
        .filter(|profile| {
            needle
                .as_deref()
                .map_or(true, |needle| matches_search(profile, needle))
        })
        .collect();

    tracing::debug!(
        uid = %viewer.uid(),
        church_id = %church_id,
        results = people.len(),
        "Listed people"
    );

    Ok(Json(PeoplePage {
        page: "people",
        church_id,
        total: people.len(),
        people,
    }))
}

fn matches_search(profile: &Profile, needle: &str) -> bool {
    profile.display_name().to_lowercase().contains(needle)
        || profile
            .email
            .as_deref()
            .is_some_and(|email| email.to_lowercase().contains(needle))
}

/// Only local absolute paths are valid return targets
fn return_path(from: Option<&str>) -> String {
    match from {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && path != LOGIN_PATH => {
            path.to_string()
        }
        _ => HOME_PATH.to_string(),
    }
}
