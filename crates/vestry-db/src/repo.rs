//! Repository traits
//!
//! Define async repository interfaces for profile storage.

use async_trait::async_trait;
use vestry_types::{ChurchId, Profile, ProfileUpdate, UserId};

use crate::error::DbResult;

/// Name of the profile collection/table
pub const USERS_COLLECTION: &str = "users";

/// Profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a profile by session uid
    async fn find_by_uid(&self, uid: &UserId) -> DbResult<Option<Profile>>;

    /// List all profiles belonging to a church, ordered by last then first name
    async fn list_by_church(&self, church_id: &ChurchId) -> DbResult<Vec<Profile>>;

    /// Create or replace a profile
    async fn upsert(&self, profile: Profile) -> DbResult<Profile>;

    /// Apply an edit to an existing profile.
    ///
    /// Returns [`DbError::NotFound`](crate::DbError::NotFound) if no profile exists.
    async fn update(&self, uid: &UserId, update: &ProfileUpdate) -> DbResult<Profile>;
}
