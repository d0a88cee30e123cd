//! PostgreSQL-backed profile repository.

use async_trait::async_trait;
use sqlx::PgPool;

use notenest_application::ProfileRepository;
use notenest_core::{AppError, AppResult, PrincipalId};
use notenest_domain::{Profile, ProfileId, Role};

/// PostgreSQL implementation of the profile repository port.
#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROFILE_COLUMNS: &str =
    "id, principal_id, full_name, email, phone, department, role, subjects, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: uuid::Uuid,
    principal_id: uuid::Uuid,
    full_name: String,
    email: String,
    phone: Option<String>,
    department: String,
    role: String,
    subjects: Vec<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> AppResult<Profile> {
        let role: Role = self.role.parse()?;

        Profile::new(
            ProfileId::from_uuid(self.id),
            PrincipalId::from_uuid(self.principal_id),
            self.full_name,
            self.email,
            self.phone,
            self.department,
            role,
            self.subjects,
            self.created_at,
            self.updated_at,
        )
    }
}

fn rows_into_profiles(rows: Vec<ProfileRow>) -> AppResult<Vec<Profile>> {
    rows.into_iter().map(ProfileRow::into_profile).collect()
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn create(&self, profile: Profile) -> AppResult<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, principal_id, full_name, email, phone, department, role, subjects, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.id().as_uuid())
        .bind(profile.principal_id().as_uuid())
        .bind(profile.full_name())
        .bind(profile.email())
        .bind(profile.phone())
        .bind(profile.department())
        .bind(profile.role().as_str())
        .bind(profile.subjects())
        .bind(profile.created_at())
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict("a profile already exists for this account".to_owned());
            }
            AppError::Internal(format!("failed to create profile: {error}"))
        })?;

        Ok(profile)
    }

    async fn find_by_principal(&self, principal_id: PrincipalId) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE principal_id = $1 LIMIT 1"
        ))
        .bind(principal_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find profile by principal: {error}"))
        })?;

        row.map(ProfileRow::into_profile).transpose()
    }

    async fn find_by_id(&self, profile_id: ProfileId) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 LIMIT 1"
        ))
        .bind(profile_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find profile by id: {error}")))?;

        row.map(ProfileRow::into_profile).transpose()
    }

    async fn update(&self, profile: Profile) -> AppResult<Profile> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = $2, phone = $3, department = $4, role = $5,
                subjects = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(profile.id().as_uuid())
        .bind(profile.full_name())
        .bind(profile.phone())
        .bind(profile.department())
        .bind(profile.role().as_str())
        .bind(profile.subjects())
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update profile: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "profile '{}' not found",
                profile.id()
            )));
        }

        Ok(profile)
    }

    async fn list_all(&self) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list profiles: {error}")))?;

        rows_into_profiles(rows)
    }

    async fn list_faculty(&self) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role = 'faculty' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list faculty: {error}")))?;

        rows_into_profiles(rows)
    }

    async fn delete(&self, profile_id: ProfileId) -> AppResult<()> {
        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete profile: {error}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
