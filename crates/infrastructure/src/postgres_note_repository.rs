//! PostgreSQL-backed note repository.
//!
//! Listings join the uploader's profile so the catalogue can show and
//! search by uploader name without a second query.

use async_trait::async_trait;
use sqlx::PgPool;
use url::Url;

use notenest_application::NoteRepository;
use notenest_core::{AppError, AppResult};
use notenest_domain::{Note, NoteId, ProfileId};

/// PostgreSQL implementation of the note repository port.
#[derive(Clone)]
pub struct PostgresNoteRepository {
    pool: PgPool,
}

impl PostgresNoteRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const NOTE_SELECT: &str = r#"
    SELECT n.id, n.title, n.description, n.subject, n.department,
           n.file_url, n.file_name, n.file_size, n.uploaded_by,
           p.full_name AS uploader_name, n.created_at, n.updated_at
    FROM notes n
    LEFT JOIN profiles p ON p.id = n.uploaded_by
"#;

#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: uuid::Uuid,
    title: String,
    description: Option<String>,
    subject: String,
    department: String,
    file_url: String,
    file_name: String,
    file_size: Option<i64>,
    uploaded_by: uuid::Uuid,
    uploader_name: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl NoteRow {
    fn into_note(self) -> AppResult<Note> {
        let file_url = Url::parse(&self.file_url)
            .map_err(|error| AppError::Internal(format!("stored file URL is invalid: {error}")))?;

        Note::new(
            NoteId::from_uuid(self.id),
            self.title,
            self.description,
            self.subject,
            self.department,
            file_url,
            self.file_name,
            self.file_size.map(|size| size as u64),
            ProfileId::from_uuid(self.uploaded_by),
            self.uploader_name,
            self.created_at,
            self.updated_at,
        )
    }
}

#[async_trait]
impl NoteRepository for PostgresNoteRepository {
    async fn insert(&self, note: Note) -> AppResult<Note> {
        sqlx::query(
            r#"
            INSERT INTO notes (id, title, description, subject, department,
                               file_url, file_name, file_size, uploaded_by,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(note.id().as_uuid())
        .bind(note.title())
        .bind(note.description())
        .bind(note.subject())
        .bind(note.department())
        .bind(note.file_url().as_str())
        .bind(note.file_name())
        .bind(note.file_size().map(|size| size as i64))
        .bind(note.uploaded_by().as_uuid())
        .bind(note.created_at())
        .bind(note.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert note: {error}")))?;

        Ok(note)
    }

    async fn list(&self) -> AppResult<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(&format!(
            "{NOTE_SELECT} ORDER BY n.created_at DESC, n.id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list notes: {error}")))?;

        rows.into_iter().map(NoteRow::into_note).collect()
    }

    async fn find_by_id(&self, note_id: NoteId) -> AppResult<Option<Note>> {
        let row = sqlx::query_as::<_, NoteRow>(&format!("{NOTE_SELECT} WHERE n.id = $1 LIMIT 1"))
            .bind(note_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find note: {error}")))?;

        row.map(NoteRow::into_note).transpose()
    }

    async fn delete(&self, note_id: NoteId) -> AppResult<()> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(note_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete note: {error}")))?;

        Ok(())
    }
}
