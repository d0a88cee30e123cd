//! Note domain types.

use chrono::{DateTime, Utc};
use notenest_core::{AppError, AppResult, UploadError};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::profile::ProfileId;

/// Size ceiling for uploaded note files (5 MiB).
pub const MAX_NOTE_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Unique identifier for a note record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Creates a new random note identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a note identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Caller-supplied note attributes for an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    title: String,
    description: Option<String>,
    subject: String,
}

impl NoteDraft {
    /// Creates a validated draft.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        subject: impl Into<String>,
    ) -> AppResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_owned()));
        }

        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(AppError::Validation(
                "subject must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            title: title.trim().to_owned(),
            description: description.filter(|value| !value.trim().is_empty()),
            subject: subject.trim().to_owned(),
        })
    }

    /// Returns the note title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the subject the note belongs to.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }
}

/// An in-memory file handed to the upload pipeline.
#[derive(Debug, Clone)]
pub struct FileUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl FileUpload {
    /// Creates a file upload from its original name and contents.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> AppResult<Self> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(AppError::Validation(
                "file name must not be empty".to_owned(),
            ));
        }

        Ok(Self { file_name, bytes })
    }

    /// Returns the original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Returns the file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Rejects files over the size ceiling. Runs before any I/O.
    pub fn ensure_within_limit(&self) -> Result<(), UploadError> {
        if self.size() > MAX_NOTE_FILE_BYTES {
            return Err(UploadError::FileTooLarge {
                size: self.size(),
                limit: MAX_NOTE_FILE_BYTES,
            });
        }

        Ok(())
    }

    /// Consumes the upload, returning the contents.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A unit of shared content in the catalogue.
///
/// Immutable once created except for admin-initiated deletion. The subject
/// is a loose foreign key into the union of faculty subject sets: removing
/// a taught subject does not retract existing notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    title: String,
    description: Option<String>,
    subject: String,
    department: String,
    file_url: Url,
    file_name: String,
    file_size: Option<u64>,
    uploaded_by: ProfileId,
    uploader_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a note with validated fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        description: Option<String>,
        subject: impl Into<String>,
        department: impl Into<String>,
        file_url: Url,
        file_name: impl Into<String>,
        file_size: Option<u64>,
        uploaded_by: ProfileId,
        uploader_name: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_owned()));
        }

        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(AppError::Validation(
                "subject must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            title,
            description,
            subject,
            department: department.into(),
            file_url,
            file_name: file_name.into(),
            file_size,
            uploaded_by,
            uploader_name,
            created_at,
            updated_at,
        })
    }

    /// Returns the note identifier.
    #[must_use]
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the subject tag.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the department tag.
    #[must_use]
    pub fn department(&self) -> &str {
        self.department.as_str()
    }

    /// Returns the public locator of the stored file.
    #[must_use]
    pub fn file_url(&self) -> &Url {
        &self.file_url
    }

    /// Returns the original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Returns the file size in bytes, when recorded.
    #[must_use]
    pub fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    /// Returns the uploader's profile identifier.
    #[must_use]
    pub fn uploaded_by(&self) -> ProfileId {
        self.uploaded_by
    }

    /// Returns the denormalized uploader name, when the listing joined it.
    #[must_use]
    pub fn uploader_name(&self) -> Option<&str> {
        self.uploader_name.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
