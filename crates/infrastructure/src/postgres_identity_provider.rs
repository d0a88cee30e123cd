//! PostgreSQL-backed identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use url::Url;
use uuid::Uuid;

use notenest_application::{EmailService, IdentityProvider, PasswordHasher, Principal};
use notenest_core::{AppError, AuthError, PrincipalId};

use crate::verification_mail::{send_verification, token_digest};

/// Identity provider persisting credentials in the `principals` table.
pub struct PostgresIdentityProvider {
    pool: PgPool,
    password_hasher: Arc<dyn PasswordHasher>,
    email_service: Arc<dyn EmailService>,
    verify_base_url: Url,
}

impl PostgresIdentityProvider {
    /// Creates a provider with the given pool and collaborators.
    #[must_use]
    pub fn new(
        pool: PgPool,
        password_hasher: Arc<dyn PasswordHasher>,
        email_service: Arc<dyn EmailService>,
        verify_base_url: Url,
    ) -> Self {
        Self {
            pool,
            password_hasher,
            email_service,
            verify_base_url,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    email: String,
    email_verified: bool,
    password_hash: String,
}

impl PrincipalRow {
    fn principal(&self) -> Principal {
        Principal {
            id: PrincipalId::from_uuid(self.id),
            email: self.email.clone(),
            verified: self.email_verified,
        }
    }
}

fn store_error(operation: &str, error: sqlx::Error) -> AuthError {
    AuthError::Store(AppError::Internal(format!("failed to {operation}: {error}")))
}

#[async_trait]
impl IdentityProvider for PostgresIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let password_hash = self.password_hasher.hash_password(password)?;
        let token = Uuid::new_v4().simple().to_string();

        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            INSERT INTO principals (id, email, email_verified, password_hash, verification_token_digest)
            VALUES ($1, LOWER($2), FALSE, $3, $4)
            RETURNING id, email, email_verified, password_hash
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&password_hash)
        .bind(token_digest(&token))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AuthError::EmailAlreadyRegistered;
            }
            store_error("create identity", error)
        })?;

        send_verification(
            self.email_service.as_ref(),
            &self.verify_base_url,
            &row.email,
            &token,
        )
        .await?;

        Ok(row.principal())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, email, email_verified, password_hash
            FROM principals
            WHERE email = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("authenticate", error))?;

        let Some(row) = row else {
            // Burn a hash so unknown emails cost as much as wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .password_hasher
            .verify_password(password, &row.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(row.principal())
    }

    async fn invalidate_session(&self, _principal_id: PrincipalId) -> Result<(), AuthError> {
        // Session state lives in the cookie store, nothing to do here.
        Ok(())
    }

    async fn confirm_email(&self, token: &str) -> Result<Principal, AuthError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            UPDATE principals
            SET email_verified = TRUE, verification_token_digest = NULL, updated_at = now()
            WHERE verification_token_digest = $1
            RETURNING id, email, email_verified, password_hash
            "#,
        )
        .bind(token_digest(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("confirm email", error))?
        .ok_or(AuthError::InvalidCredentials)?;

        Ok(row.principal())
    }
}
