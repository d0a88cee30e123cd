//! Profile resolution and mutation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use notenest_core::{AppResult, PrincipalId, ProfileError};
use notenest_domain::{Profile, ProfileId, ProfilePatch, Role};

/// Repository port for profile persistence.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Persists a newly created profile. Fails on a duplicate principal.
    async fn create(&self, profile: Profile) -> AppResult<Profile>;

    /// Finds the profile keyed to a principal.
    async fn find_by_principal(&self, principal_id: PrincipalId) -> AppResult<Option<Profile>>;

    /// Finds a profile by its identifier.
    async fn find_by_id(&self, profile_id: ProfileId) -> AppResult<Option<Profile>>;

    /// Persists an already-validated replacement profile.
    async fn update(&self, profile: Profile) -> AppResult<Profile>;

    /// Lists every profile, newest-first.
    async fn list_all(&self) -> AppResult<Vec<Profile>>;

    /// Lists faculty profiles (facet source).
    async fn list_faculty(&self) -> AppResult<Vec<Profile>>;

    /// Deletes a profile row. The principal behind it survives.
    async fn delete(&self, profile_id: ProfileId) -> AppResult<()>;
}

/// Application service resolving principals to profiles.
#[derive(Clone)]
pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    /// Creates a new profile service.
    #[must_use]
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    /// Resolves the profile for a principal.
    ///
    /// `NotFound` means the session must be treated as unauthenticated
    /// for authorization purposes (fail-closed). Idempotent: repeated
    /// loads with no intervening write return identical values.
    pub async fn load_profile(&self, principal_id: PrincipalId) -> Result<Profile, ProfileError> {
        self.repository
            .find_by_principal(principal_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Applies an owner patch to the principal's profile.
    ///
    /// The faculty-subject invariant is enforced in the domain before any
    /// store write; on rejection the stored profile is left unmodified.
    pub async fn update_profile(
        &self,
        principal_id: PrincipalId,
        patch: ProfilePatch,
    ) -> Result<Profile, ProfileError> {
        let profile = self.load_profile(principal_id).await?;
        let updated = profile.apply_patch(patch, Utc::now())?;
        Ok(self.repository.update(updated).await?)
    }

    /// Replaces a profile's role.
    ///
    /// Admin-only by contract; the authorization guard gates the caller
    /// before this is invoked, not internally.
    pub async fn set_role(&self, profile_id: ProfileId, role: Role) -> Result<Profile, ProfileError> {
        let profile = self
            .repository
            .find_by_id(profile_id)
            .await?
            .ok_or(ProfileError::NotFound)?;

        let updated = profile.with_role(role, Utc::now());
        Ok(self.repository.update(updated).await?)
    }

    /// Lists every profile, newest-first (admin user management).
    pub async fn list_users(&self) -> AppResult<Vec<Profile>> {
        self.repository.list_all().await
    }

    /// Lists faculty profiles (facet source).
    pub async fn list_faculty(&self) -> AppResult<Vec<Profile>> {
        self.repository.list_faculty().await
    }

    /// Deletes a profile row (admin user management). The identity behind
    /// it is untouched; its next profile load fails closed.
    pub async fn delete_profile(&self, profile_id: ProfileId) -> AppResult<()> {
        self.repository.delete(profile_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use notenest_core::{AppError, AppResult, PrincipalId, ProfileError};
    use notenest_domain::{Profile, ProfileId, ProfilePatch, Role};
    use tokio::sync::Mutex;

    use super::{ProfileRepository, ProfileService};

    #[derive(Default)]
    struct FakeProfileRepository {
        profiles: Mutex<Vec<Profile>>,
    }

    impl FakeProfileRepository {
        async fn seed(&self, profile: Profile) {
            self.profiles.lock().await.push(profile);
        }
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
            let existing = profiles
                .iter_mut()
                .find(|entry| entry.id() == profile.id())
                .ok_or_else(|| AppError::NotFound("profile".to_owned()))?;
            *existing = profile.clone();
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

    fn faculty(principal_id: PrincipalId) -> Profile {
        Profile::new(
            ProfileId::new(),
            principal_id,
            "Grace Hopper",
            "grace@example.edu",
            None,
            "Computer Science",
            Role::Faculty,
            vec!["Algorithms".to_owned()],
            Utc::now(),
            Utc::now(),
        )
        .unwrap_or_else(|_| panic!("profile"))
    }

    #[tokio::test]
    async fn load_profile_fails_closed_when_missing() {
        let service = ProfileService::new(Arc::new(FakeProfileRepository::default()));
        let result = service.load_profile(PrincipalId::new()).await;
        assert!(matches!(result, Err(ProfileError::NotFound)));
    }

    #[tokio::test]
    async fn load_profile_is_idempotent() {
        let repository = Arc::new(FakeProfileRepository::default());
        let principal_id = PrincipalId::new();
        repository.seed(faculty(principal_id)).await;
        let service = ProfileService::new(repository);

        let first = service
            .load_profile(principal_id)
            .await
            .unwrap_or_else(|_| panic!("first load"));
        let second = service
            .load_profile(principal_id)
            .await
            .unwrap_or_else(|_| panic!("second load"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_rejecting_invariant_leaves_store_unmodified() {
        let repository = Arc::new(FakeProfileRepository::default());
        let principal_id = PrincipalId::new();
        repository.seed(faculty(principal_id)).await;
        let service = ProfileService::new(repository.clone());

        let patch = ProfilePatch {
            subjects: Some(Vec::new()),
            ..ProfilePatch::default()
        };
        let result = service.update_profile(principal_id, patch).await;
        assert!(matches!(result, Err(ProfileError::FacultyRequiresSubject)));

        let stored = repository
            .find_by_principal(principal_id)
            .await
            .unwrap_or_else(|_| panic!("lookup"))
            .unwrap_or_else(|| panic!("profile missing"));
        assert_eq!(stored.subjects(), ["Algorithms"]);
    }

    #[tokio::test]
    async fn set_role_replaces_role_only() {
        let repository = Arc::new(FakeProfileRepository::default());
        let principal_id = PrincipalId::new();
        let profile = faculty(principal_id);
        let profile_id = profile.id();
        repository.seed(profile).await;
        let service = ProfileService::new(repository);

        let updated = service
            .set_role(profile_id, Role::Admin)
            .await
            .unwrap_or_else(|_| panic!("set role"));
        assert_eq!(updated.role(), Role::Admin);
        assert_eq!(updated.full_name(), "Grace Hopper");
    }
}
