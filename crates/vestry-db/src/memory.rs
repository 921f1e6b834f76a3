//! In-memory profile repository
//!
//! Used for local runs without a database and as the backing store in tests.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use vestry_types::{ChurchId, Profile, ProfileUpdate, UserId};

use crate::error::{DbError, DbResult};
use crate::repo::ProfileRepository;

/// In-memory profile repository keyed by uid
#[derive(Debug, Default, Clone)]
pub struct MemoryProfileRepository {
    profiles: Arc<DashMap<UserId, Profile>>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with profiles
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let repo = Self::new();
        for profile in profiles {
            repo.profiles.insert(profile.uid.clone(), profile);
        }
        repo
    }

    /// Remove a profile (simulates out-of-band deletion)
    pub fn remove(&self, uid: &UserId) -> Option<Profile> {
        self.profiles.remove(uid).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn find_by_uid(&self, uid: &UserId) -> DbResult<Option<Profile>> {
        Ok(self.profiles.get(uid).map(|r| r.value().clone()))
    }

    async fn list_by_church(&self, church_id: &ChurchId) -> DbResult<Vec<Profile>> {
        let mut members: Vec<Profile> = self
            .profiles
            .iter()
            .filter(|r| r.value().in_church(church_id))
            .map(|r| r.value().clone())
            .collect();
        members.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        Ok(members)
    }

    async fn upsert(&self, profile: Profile) -> DbResult<Profile> {
        self.profiles.insert(profile.uid.clone(), profile.clone());
        Ok(profile)
    }

    async fn update(&self, uid: &UserId, update: &ProfileUpdate) -> DbResult<Profile> {
        let mut entry = self.profiles.get_mut(uid).ok_or(DbError::NotFound)?;
        entry.apply(update);
        Ok(entry.value().clone())
    }
}
