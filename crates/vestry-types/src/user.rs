//! User types

use serde::{Deserialize, Serialize};

use crate::Role;

/// Identity-provider user identifier (opaque uid)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Wrap a uid string
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Borrow the raw uid
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(uid: &str) -> Self {
        Self(uid.to_string())
    }
}

/// Church (tenant) identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChurchId(pub String);

impl ChurchId {
    /// Wrap a church id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChurchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChurchId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Application-level user record, keyed by the session uid.
///
/// Field names on the wire match the `users` document layout
/// (`firstName`, `churchId`, `photoURL`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Owner uid
    pub uid: UserId,
    /// Contact email
    pub email: Option<String>,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Membership role
    pub role: Role,
    /// Church the user belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_id: Option<ChurchId>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Avatar URL
    #[serde(
        default,
        rename = "photoURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
}

impl Profile {
    /// Display name as "First Last"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the profile belongs to the given church
    pub fn in_church(&self, church_id: &ChurchId) -> bool {
        self.church_id.as_ref() == Some(church_id)
    }

    /// Apply an edit from the profile form.
    ///
    /// Email and role are never touched here.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        self.first_name = update.first_name.clone();
        self.last_name = update.last_name.clone();
        self.phone = update.phone.clone().filter(|p| !p.is_empty());
    }
}

/// Editable subset of a [`Profile`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// Given name (required, non-empty)
    pub first_name: String,
    /// Family name (required, non-empty)
    pub last_name: String,
    /// Phone number; empty clears it
    #[serde(default)]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Check required fields
    pub fn validate(&self) -> Result<(), crate::VestryError> {
        if self.first_name.trim().is_empty() {
            return Err(crate::VestryError::InvalidInput(
                "firstName is required".to_string(),
            ));
        }
        if self.last_name.trim().is_empty() {
            return Err(crate::VestryError::InvalidInput(
                "lastName is required".to_string(),
            ));
        }
        Ok(())
    }
}
