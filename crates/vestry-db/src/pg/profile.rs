//! PostgreSQL profile repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use vestry_types::{ChurchId, Profile, ProfileUpdate, UserId};

use crate::error::{DbError, DbResult};
use crate::models::ProfileRow;
use crate::repo::ProfileRepository;

/// PostgreSQL profile repository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_uid(&self, uid: &UserId) -> DbResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT uid, email, first_name, last_name, role, church_id,
                   phone, photo_url, created_at, updated_at
            FROM users
            WHERE uid = $1
            "#,
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn list_by_church(&self, church_id: &ChurchId) -> DbResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT uid, email, first_name, last_name, role, church_id,
                   phone, photo_url, created_at, updated_at
            FROM users
            WHERE church_id = $1
            ORDER BY last_name, first_name
            "#,
        )
        .bind(church_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    async fn upsert(&self, profile: Profile) -> DbResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO users (uid, email, first_name, last_name, role, church_id, phone, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (uid) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                role = EXCLUDED.role,
                church_id = EXCLUDED.church_id,
                phone = EXCLUDED.phone,
                photo_url = EXCLUDED.photo_url,
                updated_at = NOW()
            RETURNING uid, email, first_name, last_name, role, church_id,
                      phone, photo_url, created_at, updated_at
            "#,
        )
        .bind(profile.uid.as_str())
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.role.as_str())
        .bind(profile.church_id.as_ref().map(ChurchId::as_str))
        .bind(&profile.phone)
        .bind(&profile.photo_url)
        .fetch_one(&self.pool)
        .await?;

        Profile::try_from(row)
    }

    async fn update(&self, uid: &UserId, update: &ProfileUpdate) -> DbResult<Profile> {
        let phone = update.phone.as_deref().filter(|p| !p.is_empty());

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, phone = $4, updated_at = NOW()
            WHERE uid = $1
            RETURNING uid, email, first_name, last_name, role, church_id,
                      phone, photo_url, created_at, updated_at
            "#,
        )
        .bind(uid.as_str())
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)?;

        Profile::try_from(row)
    }
}
