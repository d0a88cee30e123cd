//! In-memory note repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use notenest_application::NoteRepository;
use notenest_core::{AppError, AppResult};
use notenest_domain::{Note, NoteId};

/// Note repository keeping the catalogue in process memory.
#[derive(Default)]
pub struct InMemoryNoteRepository {
    notes: RwLock<HashMap<NoteId, Note>>,
}

impl InMemoryNoteRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn insert(&self, note: Note) -> AppResult<Note> {
        let mut notes = self.notes.write().await;

        if notes.contains_key(&note.id()) {
            return Err(AppError::Conflict(format!(
                "note '{}' already exists",
                note.id()
            )));
        }

        notes.insert(note.id(), note.clone());
        Ok(note)
    }

    async fn list(&self) -> AppResult<Vec<Note>> {
        let notes = self.notes.read().await;
        let mut listed: Vec<Note> = notes.values().cloned().collect();
        // Newest first, id as a stable tie-breaker.
        listed.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| right.id().as_uuid().cmp(&left.id().as_uuid()))
        });
        Ok(listed)
    }

    async fn find_by_id(&self, note_id: NoteId) -> AppResult<Option<Note>> {
        Ok(self.notes.read().await.get(&note_id).cloned())
    }

    async fn delete(&self, note_id: NoteId) -> AppResult<()> {
        self.notes.write().await.remove(&note_id);
        Ok(())
    }
}
