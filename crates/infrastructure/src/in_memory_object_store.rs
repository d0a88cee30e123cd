//! In-memory object store for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use notenest_application::ObjectStore;
use notenest_core::{AppError, AppResult};

const BASE_URL: &str = "memory://object-store/";

/// Object store keeping blobs in process memory.
///
/// Mints `memory://` locators; they are not dereferenceable outside the
/// process, which is fine for tests and local development.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the stored bytes for a path, if present.
    pub async fn get_object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(path).cloned()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, path: &str, bytes: &[u8]) -> AppResult<()> {
        self.objects
            .write()
            .await
            .insert(path.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn remove_object(&self, path: &str) -> AppResult<()> {
        self.objects.write().await.remove(path);
        Ok(())
    }

    async fn resolve_locator(&self, path: &str) -> AppResult<Url> {
        Url::parse(BASE_URL)
            .and_then(|base| base.join(path))
            .map_err(|error| AppError::Internal(format!("failed to build locator: {error}")))
    }

    fn locator_path(&self, locator: &Url) -> Option<String> {
        locator
            .as_str()
            .strip_prefix(BASE_URL)
            .map(ToOwned::to_owned)
    }
}
