//! Note catalogue ports and the upload pipeline.
//!
//! The pipeline is partially compensable by design: once a blob is
//! stored, later failures orphan it rather than roll it back. Catalogue
//! correctness always wins over storage hygiene.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;
use url::Url;

use notenest_core::{AppError, AppResult, UploadError};
use notenest_domain::{
    FileUpload, FilterFacets, Note, NoteDraft, NoteId, Profile, available_filter_facets,
    can_upload, filter_by_department, filter_by_search, filter_by_subject, visible_notes,
};

use crate::ProfileRepository;

/// Port for the external blob substrate.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores bytes under a path. Overwrites are not expected: paths are
    /// collision-free by construction.
    async fn put_object(&self, path: &str, bytes: &[u8]) -> AppResult<()>;

    /// Removes the object at a path.
    async fn remove_object(&self, path: &str) -> AppResult<()>;

    /// Resolves a publicly dereferenceable locator for a stored path.
    async fn resolve_locator(&self, path: &str) -> AppResult<Url>;

    /// Inverse of [`resolve_locator`](Self::resolve_locator): recovers
    /// the storage path from a locator minted by this store, or `None`
    /// for a foreign locator.
    fn locator_path(&self, locator: &Url) -> Option<String>;
}

/// Repository port for note metadata rows.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Inserts a metadata row.
    async fn insert(&self, note: Note) -> AppResult<Note>;

    /// Lists the full catalogue, newest-first, with uploader names
    /// joined in.
    async fn list(&self) -> AppResult<Vec<Note>>;

    /// Finds a note by its identifier.
    async fn find_by_id(&self, note_id: NoteId) -> AppResult<Option<Note>>;

    /// Deletes a metadata row.
    async fn delete(&self, note_id: NoteId) -> AppResult<()>;
}

/// Search refinement over the visible catalogue. All criteria are
/// conjunctive; blank criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueQuery {
    /// Case-insensitive substring over title, description, uploader name.
    pub search: Option<String>,
    /// Exact subject match.
    pub subject: Option<String>,
    /// Exact department match.
    pub department: Option<String>,
}

/// Application service for the note catalogue and upload pipeline.
#[derive(Clone)]
pub struct NoteService {
    object_store: Arc<dyn ObjectStore>,
    note_repository: Arc<dyn NoteRepository>,
    profile_repository: Arc<dyn ProfileRepository>,
}

impl NoteService {
    /// Creates a new note service.
    #[must_use]
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        note_repository: Arc<dyn NoteRepository>,
        profile_repository: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            object_store,
            note_repository,
            profile_repository,
        }
    }

    /// Runs the upload pipeline: validate, store blob, resolve locator,
    /// insert metadata.
    ///
    /// Permitted only for faculty with at least one subject, and only for
    /// one of the uploader's own subjects. The size ceiling is enforced
    /// before any I/O. Failures after the blob write orphan the blob;
    /// callers should refetch the catalogue after success.
    pub async fn upload(
        &self,
        profile: &Profile,
        draft: &NoteDraft,
        file: FileUpload,
    ) -> Result<Note, UploadError> {
        if !can_upload(profile) {
            return Err(UploadError::NotPermitted);
        }

        if !profile.has_subject(draft.subject()) {
            return Err(UploadError::Store(AppError::Validation(format!(
                "'{}' is not one of your subjects",
                draft.subject()
            ))));
        }

        file.ensure_within_limit()?;

        // Principal id + millisecond timestamp + original name keeps paths
        // collision-free across concurrent uploads.
        let now = Utc::now();
        let path = format!(
            "{}/{}-{}",
            profile.principal_id(),
            now.timestamp_millis(),
            sanitize_file_name(file.file_name()),
        );

        let file_name = file.file_name().to_owned();
        let file_size = file.size();

        self.object_store
            .put_object(&path, file.bytes())
            .await
            .map_err(|error| UploadError::StorageWriteFailed(error.to_string()))?;

        let locator = self
            .object_store
            .resolve_locator(&path)
            .await
            .map_err(|error| UploadError::LocatorUnavailable(error.to_string()))?;

        let note = Note::new(
            NoteId::new(),
            draft.title(),
            draft.description().map(ToOwned::to_owned),
            draft.subject(),
            profile.department(),
            locator,
            file_name,
            Some(file_size),
            profile.id(),
            Some(profile.full_name().to_owned()),
            now,
            now,
        )
        .map_err(UploadError::Store)?;

        self.note_repository
            .insert(note)
            .await
            .map_err(|error| UploadError::MetadataWriteFailed(error.to_string()))
    }

    /// Deletes a note from the catalogue (admin-gated by the caller).
    ///
    /// Blob removal is attempted first; a storage failure is logged and
    /// does not block the metadata delete. An orphaned blob beats a
    /// dangling catalogue entry.
    pub async fn delete_note(&self, note_id: NoteId) -> Result<(), UploadError> {
        let note = self
            .note_repository
            .find_by_id(note_id)
            .await?
            .ok_or_else(|| {
                UploadError::Store(AppError::NotFound(format!("note '{note_id}' not found")))
            })?;

        match self.object_store.locator_path(note.file_url()) {
            Some(path) => {
                if let Err(error) = self.object_store.remove_object(&path).await {
                    warn!(
                        note_id = %note_id,
                        path = path.as_str(),
                        "failed to remove stored file, deleting metadata anyway: {error}"
                    );
                }
            }
            None => {
                warn!(note_id = %note_id, "note locator does not map to a storage path");
            }
        }

        self.note_repository.delete(note_id).await?;
        Ok(())
    }

    /// Returns the catalogue subset visible to the profile, newest-first.
    /// The fetched listing is an immutable snapshot per call.
    pub async fn catalogue(&self, profile: &Profile) -> AppResult<Vec<Note>> {
        let notes = self.note_repository.list().await?;
        Ok(visible_notes(profile, notes))
    }

    /// Returns the visible catalogue refined by the query; refinements
    /// run after, never instead of, the role-based filter.
    pub async fn search(&self, profile: &Profile, query: &CatalogueQuery) -> AppResult<Vec<Note>> {
        let mut notes = self.catalogue(profile).await?;

        if let Some(term) = query.search.as_deref() {
            notes = filter_by_search(notes, term);
        }
        if let Some(subject) = query.subject.as_deref() {
            notes = filter_by_subject(notes, subject);
        }
        if let Some(department) = query.department.as_deref() {
            notes = filter_by_department(notes, department);
        }

        Ok(notes)
    }

    /// Returns the full catalogue, newest-first (admin note management).
    pub async fn list_all(&self) -> AppResult<Vec<Note>> {
        self.note_repository.list().await
    }

    /// Projects the filter facets from the current faculty profile set.
    pub async fn filter_facets(&self) -> AppResult<FilterFacets> {
        let faculty = self.profile_repository.list_faculty().await?;
        Ok(available_filter_facets(&faculty))
    }
}

/// Keeps user-supplied file names from escaping the storage prefix.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|character| match character {
            '/' | '\\' => '_',
            other => other,
        })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "file".to_owned(),
        _ => cleaned,
    }
}
