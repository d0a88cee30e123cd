//! Catalogue handlers: listing, facets, upload.

use axum::Json;
use axum::extract::{Extension, Multipart, Query, State};
use notenest_application::CatalogueQuery;
use notenest_core::{AppError, SessionIdentity};
use notenest_domain::{FileUpload, NoteDraft};

use crate::dto::{FacetsResponse, NoteListQuery, NoteResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/notes - The caller's visible catalogue, optionally refined.
pub async fn list_notes_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Query(query): Query<NoteListQuery>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let profile = state
        .profile_service
        .load_profile(identity.principal_id())
        .await?;

    let catalogue_query = CatalogueQuery {
        search: query.search,
        subject: query.subject,
        department: query.department,
    };

    let notes = state.note_service.search(&profile, &catalogue_query).await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// GET /api/notes/facets - Filter options drawn from faculty profiles.
pub async fn note_facets_handler(
    State(state): State<AppState>,
    Extension(_identity): Extension<SessionIdentity>,
) -> ApiResult<Json<FacetsResponse>> {
    let facets = state.note_service.filter_facets().await?;
    Ok(Json(facets.into()))
}

/// POST /api/notes - Multipart upload of a note file plus its metadata.
///
/// Expects `title`, `subject`, optional `description` text fields and a
/// single `file` part.
pub async fn upload_note_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    mut multipart: Multipart,
) -> ApiResult<Json<NoteResponse>> {
    let profile = state
        .profile_service
        .load_profile(identity.principal_id())
        .await?;

    let mut title = None;
    let mut description = None;
    let mut subject = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|error| {
        AppError::Validation(format!("malformed multipart request: {error}"))
    })? {
        match field.name().unwrap_or_default() {
            "title" => title = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "subject" => subject = Some(read_text(field).await?),
            "file" => {
                let file_name = field
                    .file_name()
                    .map(ToOwned::to_owned)
                    .ok_or_else(|| AppError::Validation("file part needs a name".to_owned()))?;
                let bytes = field.bytes().await.map_err(|error| {
                    AppError::Validation(format!("failed to read file part: {error}"))
                })?;
                file = Some(FileUpload::new(file_name, bytes.to_vec())?);
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| AppError::Validation("title is required".to_owned()))?;
    let subject = subject.ok_or_else(|| AppError::Validation("subject is required".to_owned()))?;
    let file = file.ok_or_else(|| AppError::Validation("file is required".to_owned()))?;

    let draft = NoteDraft::new(title, description, subject)?;
    let note = state.note_service.upload(&profile, &draft, file).await?;

    Ok(Json(note.into()))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|error| AppError::Validation(format!("failed to read text part: {error}")))
}
