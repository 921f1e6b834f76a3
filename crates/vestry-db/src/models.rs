//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use vestry_types::{ChurchId, Profile, Role, UserId};

use crate::DbError;

/// Profile row from the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub uid: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub church_id: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DbError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|e| {
            tracing::warn!(uid = %row.uid, role = %row.role, "Stored profile has unknown role");
            DbError::Decode(format!("{e}"))
        })?;

        Ok(Profile {
            uid: UserId::new(row.uid),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            church_id: row.church_id.map(ChurchId::new),
            phone: row.phone,
            photo_url: row.photo_url,
        })
    }
}
