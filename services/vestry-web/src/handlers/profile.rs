//! Profile handlers

use axum::extract::State;
use axum::Json;
use vestry_axum::RequireSession;
use vestry_db::ProfileRepository;
use vestry_types::{Profile, ProfileUpdate};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /profile
pub async fn get_profile(viewer: RequireSession) -> ApiResult<Json<Profile>> {
    viewer
        .profile
        .clone()
        .map(Json)
        .ok_or(ApiError::ProfileNotFound)
}

/// PUT /profile
///
/// Apply an edit to the viewer's own profile and return the stored result.
/// Email and role are not editable here.
pub async fn update_profile(
    State(state): State<AppState>,
    viewer: RequireSession,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    update.validate()?;

    state.profiles.update(viewer.uid(), &update).await?;
    metrics::counter!("vestry_profile_updates_total").increment(1);

    // Read back what was stored rather than echoing the request
    let profile = state
        .profiles
        .find_by_uid(viewer.uid())
        .await?
        .ok_or(ApiError::ProfileNotFound)?;

    tracing::info!(uid = %viewer.uid(), "Profile updated");

    Ok(Json(profile))
}
