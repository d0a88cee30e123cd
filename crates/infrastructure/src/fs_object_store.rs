//! Filesystem object store.
//!
//! Blobs live under a root directory and are served publicly from a base
//! URL (static file hosting or a reverse proxy in front of the root).

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use url::Url;

use notenest_application::ObjectStore;
use notenest_core::{AppError, AppResult};

/// Object store writing blobs to the local filesystem.
#[derive(Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    public_base: Url,
}

impl FsObjectStore {
    /// Creates a store rooted at `root`, minting locators under
    /// `public_base`.
    pub fn new(root: impl Into<PathBuf>, mut public_base: Url) -> AppResult<Self> {
        if public_base.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "'{public_base}' cannot serve as a storage base URL"
            )));
        }

        // Url::join drops the last segment unless the base ends in '/'.
        if !public_base.path().ends_with('/') {
            let path = format!("{}/", public_base.path());
            public_base.set_path(&path);
        }

        Ok(Self {
            root: root.into(),
            public_base,
        })
    }

    /// Maps a storage path onto the root, rejecting anything that could
    /// escape it.
    fn disk_path(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);

        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(AppError::Validation(format!(
                "invalid storage path '{path}'"
            )));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put_object(&self, path: &str, bytes: &[u8]) -> AppResult<()> {
        let disk_path = self.disk_path(path)?;

        if let Some(parent) = disk_path.parent() {
            fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!("failed to create storage directory: {error}"))
            })?;
        }

        fs::write(&disk_path, bytes)
            .await
            .map_err(|error| AppError::Internal(format!("failed to write object: {error}")))
    }

    async fn remove_object(&self, path: &str) -> AppResult<()> {
        let disk_path = self.disk_path(path)?;

        fs::remove_file(&disk_path)
            .await
            .map_err(|error| AppError::Internal(format!("failed to remove object: {error}")))
    }

    async fn resolve_locator(&self, path: &str) -> AppResult<Url> {
        // Validate even though we never touch the disk here.
        self.disk_path(path)?;

        self.public_base
            .join(path)
            .map_err(|error| AppError::Internal(format!("failed to build locator: {error}")))
    }

    fn locator_path(&self, locator: &Url) -> Option<String> {
        locator
            .as_str()
            .strip_prefix(self.public_base.as_str())
            .filter(|path| !path.is_empty())
            .map(ToOwned::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use url::Url;
    use uuid::Uuid;

    use notenest_application::ObjectStore;
    use notenest_core::AppError;

    use super::FsObjectStore;

    fn store(root: &std::path::Path) -> FsObjectStore {
        FsObjectStore::new(
            root,
            Url::parse("https://files.portal.test/notes").unwrap_or_else(|_| panic!("url")),
        )
        .unwrap_or_else(|_| panic!("store"))
    }

    fn temp_root() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("notenest-fs-store-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn put_then_remove_round_trips() {
        let root = temp_root();
        let store = store(&root);

        store
            .put_object("user/1-notes.pdf", b"content")
            .await
            .unwrap_or_else(|_| panic!("put"));
        assert!(root.join("user/1-notes.pdf").exists());

        store
            .remove_object("user/1-notes.pdf")
            .await
            .unwrap_or_else(|_| panic!("remove"));
        assert!(!root.join("user/1-notes.pdf").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected() {
        let root = temp_root();
        let store = store(&root);

        for path in ["../escape.pdf", "/etc/passwd", "a/../../b", ""] {
            let result = store.put_object(path, b"x").await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{path}");
        }

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn locator_base_gains_a_trailing_slash() {
        let root = temp_root();
        let store = store(&root);

        let locator = store
            .resolve_locator("user/1-notes.pdf")
            .await
            .unwrap_or_else(|_| panic!("locator"));
        assert_eq!(
            locator.as_str(),
            "https://files.portal.test/notes/user/1-notes.pdf"
        );
        assert_eq!(
            store.locator_path(&locator).as_deref(),
            Some("user/1-notes.pdf")
        );
    }
}
