//! In-memory identity provider for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use notenest_application::{EmailService, IdentityProvider, PasswordHasher, Principal};
use notenest_core::{AuthError, PrincipalId};

use crate::verification_mail::{send_verification, token_digest};

struct IdentityRecord {
    principal_id: PrincipalId,
    email: String,
    password_hash: String,
    verified: bool,
    verification_token_digest: Option<String>,
}

impl IdentityRecord {
    fn principal(&self) -> Principal {
        Principal {
            id: self.principal_id,
            email: self.email.clone(),
            verified: self.verified,
        }
    }
}

/// Identity provider keeping credentials in process memory.
///
/// Credential handling matches the Postgres provider: Argon2id hashes at
/// rest, digests instead of verification tokens, and a throwaway hash on
/// unknown emails so sign-in timing stays uniform.
pub struct InMemoryIdentityProvider {
    records: RwLock<HashMap<String, IdentityRecord>>,
    password_hasher: Arc<dyn PasswordHasher>,
    email_service: Arc<dyn EmailService>,
    verify_base_url: Url,
}

impl InMemoryIdentityProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new(
        password_hasher: Arc<dyn PasswordHasher>,
        email_service: Arc<dyn EmailService>,
        verify_base_url: Url,
    ) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            password_hasher,
            email_service,
            verify_base_url,
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        // Lowercased like the Postgres provider's unique-lower column.
        let email = email.to_lowercase();
        let mut records = self.records.write().await;

        if records.contains_key(&email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let password_hash = self.password_hasher.hash_password(password)?;
        let token = Uuid::new_v4().simple().to_string();

        let record = IdentityRecord {
            principal_id: PrincipalId::new(),
            email: email.clone(),
            password_hash,
            verified: false,
            verification_token_digest: Some(token_digest(&token)),
        };
        let principal = record.principal();
        records.insert(email.clone(), record);
        drop(records);

        send_verification(
            self.email_service.as_ref(),
            &self.verify_base_url,
            &email,
            &token,
        )
        .await?;

        Ok(principal)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = email.to_lowercase();
        let records = self.records.read().await;

        let Some(record) = records.get(&email) else {
            // Burn a hash so unknown emails cost as much as wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .password_hasher
            .verify_password(password, &record.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(record.principal())
    }

    async fn invalidate_session(&self, _principal_id: PrincipalId) -> Result<(), AuthError> {
        // Session state lives in the cookie store, nothing to do here.
        Ok(())
    }

    async fn confirm_email(&self, token: &str) -> Result<Principal, AuthError> {
        let digest = token_digest(token);
        let mut records = self.records.write().await;

        let record = records
            .values_mut()
            .find(|record| record.verification_token_digest.as_deref() == Some(digest.as_str()))
            .ok_or(AuthError::InvalidCredentials)?;

        record.verified = true;
        record.verification_token_digest = None;

        Ok(record.principal())
    }
}
