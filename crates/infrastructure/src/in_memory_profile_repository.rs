//! In-memory profile repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use notenest_application::ProfileRepository;
use notenest_core::{AppError, AppResult, PrincipalId};
use notenest_domain::{Profile, ProfileId, Role};

/// Profile repository keeping rows in process memory.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<ProfileId, Profile>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    fn newest_first(mut profiles: Vec<Profile>) -> Vec<Profile> {
        profiles.sort_by_key(|profile| std::cmp::Reverse(profile.created_at()));
        profiles
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: Profile) -> AppResult<Profile> {
        let mut profiles = self.profiles.write().await;

        if profiles
            .values()
            .any(|existing| existing.principal_id() == profile.principal_id())
        {
            return Err(AppError::Conflict(format!(
                "principal '{}' already has a profile",
                profile.principal_id()
            )));
        }

        profiles.insert(profile.id(), profile.clone());
        Ok(profile)
    }

    async fn find_by_principal(&self, principal_id: PrincipalId) -> AppResult<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .find(|profile| profile.principal_id() == principal_id)
            .cloned())
    }

    async fn find_by_id(&self, profile_id: ProfileId) -> AppResult<Option<Profile>> {
        Ok(self.profiles.read().await.get(&profile_id).cloned())
    }

    async fn update(&self, profile: Profile) -> AppResult<Profile> {
        let mut profiles = self.profiles.write().await;

        if !profiles.contains_key(&profile.id()) {
            return Err(AppError::NotFound(format!(
                "profile '{}' not found",
                profile.id()
            )));
        }

        profiles.insert(profile.id(), profile.clone());
        Ok(profile)
    }

    async fn list_all(&self) -> AppResult<Vec<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(Self::newest_first(profiles.values().cloned().collect()))
    }

    async fn list_faculty(&self) -> AppResult<Vec<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(Self::newest_first(
            profiles
                .values()
                .filter(|profile| profile.role() == Role::Faculty)
                .cloned()
                .collect(),
        ))
    }

    async fn delete(&self, profile_id: ProfileId) -> AppResult<()> {
        self.profiles.write().await.remove(&profile_id);
        Ok(())
    }
}
