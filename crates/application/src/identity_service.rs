//! Identity session ports and application service.
//!
//! Owns the authenticated principal's lifecycle: sign-up, sign-in,
//! sign-out, and email confirmation. Credential material never crosses
//! the provider boundary; the core holds a [`Principal`] reference plus
//! cached claims.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use notenest_core::{AuthError, PrincipalId};
use notenest_domain::{EmailAddress, Profile, ProfileSeed, validate_password};

use crate::ProfileRepository;

/// Authenticated identity reference returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable identifier issued by the provider.
    pub id: PrincipalId,
    /// Email claim cached at authentication time.
    pub email: String,
    /// Whether the provider has verified the email address.
    pub verified: bool,
}

/// Port for the external identity substrate.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a new identity for the email/password pair.
    ///
    /// Also triggers the provider's out-of-band verification email.
    async fn create_identity(&self, email: &str, password: &str)
    -> Result<Principal, AuthError>;

    /// Authenticates an email/password pair against stored credentials.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Invalidates any provider-side session state for the principal.
    async fn invalidate_session(&self, principal_id: PrincipalId) -> Result<(), AuthError>;

    /// Confirms an email address from a verification token.
    async fn confirm_email(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> notenest_core::AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    /// Must run in constant time regardless of validity.
    fn verify_password(&self, password: &str, hash: &str) -> notenest_core::AppResult<bool>;
}

/// Port for outbound email delivery (verification mail).
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text email, optionally with an HTML body.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> notenest_core::AppResult<()>;
}

/// Application service for the identity session.
#[derive(Clone)]
pub struct SessionService {
    identity_provider: Arc<dyn IdentityProvider>,
    profile_repository: Arc<dyn ProfileRepository>,
}

impl SessionService {
    /// Creates a new session service.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        profile_repository: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            identity_provider,
            profile_repository,
        }
    }

    /// Registers a new principal and creates its profile from the seed.
    ///
    /// Email shape and password length are validated locally before any
    /// provider call. Profile creation is a side effect of sign-up, not a
    /// separate caller step; a successful sign-up also triggers the
    /// provider's verification email.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        seed: &ProfileSeed,
    ) -> Result<Principal, AuthError> {
        let email = EmailAddress::new(email).map_err(AuthError::Store)?;
        validate_password(password).map_err(AuthError::Store)?;

        let principal = self
            .identity_provider
            .create_identity(email.as_str(), password)
            .await?;

        let profile = Profile::from_seed(principal.id, &principal.email, seed, Utc::now())
            .map_err(AuthError::Store)?;
        self.profile_repository
            .create(profile)
            .await
            .map_err(AuthError::Store)?;

        Ok(principal)
    }

    /// Authenticates an email/password pair.
    ///
    /// Surfaces the principal's verified flag; verification policy stays
    /// with the provider and an unverified sign-in is not blocked here.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        self.identity_provider.authenticate(email, password).await
    }

    /// Ends the principal's session at the provider.
    ///
    /// Any in-flight profile load for the prior principal becomes stale;
    /// the session context discards it by principal id.
    pub async fn sign_out(&self, principal_id: PrincipalId) -> Result<(), AuthError> {
        self.identity_provider.invalidate_session(principal_id).await
    }

    /// Confirms an email address from an out-of-band verification token.
    pub async fn confirm_email(&self, token: &str) -> Result<Principal, AuthError> {
        self.identity_provider.confirm_email(token).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use notenest_core::{AppError, AppResult, AuthError, PrincipalId};
    use notenest_domain::{Profile, ProfileId, ProfileSeed, Role};
    use tokio::sync::Mutex;

    use crate::ProfileRepository;

    use super::{IdentityProvider, Principal, SessionService};

    #[derive(Default)]
    struct FakeIdentityProvider {
        identities: Mutex<HashMap<String, Principal>>,
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentityProvider {
        async fn create_identity(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<Principal, AuthError> {
            let mut identities = self.identities.lock().await;
            if identities.contains_key(email) {
                return Err(AuthError::EmailAlreadyRegistered);
            }

            let principal = Principal {
                id: PrincipalId::new(),
                email: email.to_owned(),
                verified: false,
            };
            identities.insert(email.to_owned(), principal.clone());
            Ok(principal)
        }

        async fn authenticate(&self, email: &str, _password: &str) -> Result<Principal, AuthError> {
            self.identities
                .lock()
                .await
                .get(email)
                .cloned()
                .ok_or(AuthError::InvalidCredentials)
        }

        async fn invalidate_session(&self, _principal_id: PrincipalId) -> Result<(), AuthError> {
            Ok(())
        }

        async fn confirm_email(&self, _token: &str) -> Result<Principal, AuthError> {
            Err(AuthError::InvalidCredentials)
        }
    }

    #[derive(Default)]
    struct FakeProfileRepository {
        profiles: Mutex<Vec<Profile>>,
    }

    #[async_trait]
    impl ProfileRepository for FakeProfileRepository {
        async fn create(&self, profile: Profile) -> AppResult<Profile> {
            self.profiles.lock().await.push(profile.clone());
            Ok(profile)
        }

        async fn find_by_principal(
            &self,
            principal_id: PrincipalId,
        ) -> AppResult<Option<Profile>> {
            Ok(self
                .profiles
                .lock()
                .await
                .iter()
                .find(|profile| profile.principal_id() == principal_id)
                .cloned())
        }

        async fn find_by_id(&self, profile_id: ProfileId) -> AppResult<Option<Profile>> {
            Ok(self
                .profiles
                .lock()
                .await
                .iter()
                .find(|profile| profile.id() == profile_id)
                .cloned())
        }

        async fn update(&self, profile: Profile) -> AppResult<Profile> {
            let mut profiles = self.profiles.lock().await;
            if let Some(existing) = profiles.iter_mut().find(|entry| entry.id() == profile.id())
            {
                *existing = profile.clone();
            }
            Ok(profile)
        }

        async fn list_all(&self) -> AppResult<Vec<Profile>> {
            Ok(self.profiles.lock().await.clone())
        }

        async fn list_faculty(&self) -> AppResult<Vec<Profile>> {
            Ok(self
                .profiles
                .lock()
                .await
                .iter()
                .filter(|profile| profile.role() == Role::Faculty)
                .cloned()
                .collect())
        }

        async fn delete(&self, profile_id: ProfileId) -> AppResult<()> {
            self.profiles
                .lock()
                .await
                .retain(|profile| profile.id() != profile_id);
            Ok(())
        }
    }

    fn seed(role: Role, subjects: Vec<String>) -> ProfileSeed {
        ProfileSeed::new("Grace Hopper", None, "Computer Science", role, subjects)
            .unwrap_or_else(|_| panic!("seed"))
    }

    #[tokio::test]
    async fn sign_up_creates_principal_and_profile() {
        let provider = Arc::new(FakeIdentityProvider::default());
        let repository = Arc::new(FakeProfileRepository::default());
        let service = SessionService::new(provider, repository.clone());

        let principal = service
            .sign_up(
                "grace@example.edu",
                "secret-passphrase",
                &seed(Role::Faculty, vec!["Algorithms".to_owned()]),
            )
            .await
            .unwrap_or_else(|_| panic!("sign up"));

        let profile = repository
            .find_by_principal(principal.id)
            .await
            .unwrap_or_else(|_| panic!("lookup"))
            .unwrap_or_else(|| panic!("profile missing"));
        assert_eq!(profile.email(), "grace@example.edu");
        assert_eq!(profile.role(), Role::Faculty);
    }

    #[tokio::test]
    async fn sign_up_rejects_short_password_before_provider_call() {
        let provider = Arc::new(FakeIdentityProvider::default());
        let service = SessionService::new(provider.clone(), Arc::new(FakeProfileRepository::default()));

        let result = service
            .sign_up("grace@example.edu", "tiny", &seed(Role::Student, Vec::new()))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Store(AppError::Validation(_)))
        ));
        assert!(provider.identities.lock().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_already_registered() {
        let provider = Arc::new(FakeIdentityProvider::default());
        let service = SessionService::new(provider, Arc::new(FakeProfileRepository::default()));
        let student_seed = seed(Role::Student, Vec::new());

        service
            .sign_up("grace@example.edu", "secret-passphrase", &student_seed)
            .await
            .unwrap_or_else(|_| panic!("first sign up"));
        let result = service
            .sign_up("grace@example.edu", "other-passphrase", &student_seed)
            .await;

        assert!(matches!(result, Err(AuthError::EmailAlreadyRegistered)));
    }
}
