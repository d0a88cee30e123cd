//! Admin handlers for user and note management.
//!
//! Every handler re-checks the caller's role against the freshly loaded
//! profile; the session cookie alone never grants admin access.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use notenest_core::{AppError, SessionIdentity};
use notenest_domain::{NoteId, Profile, ProfileId, Role, can_manage_notes, can_manage_users};
use uuid::Uuid;

use crate::dto::{NoteResponse, ProfileResponse, SetRoleRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

async fn require_admin(state: &AppState, identity: &SessionIdentity) -> Result<Profile, ApiError> {
    let profile = state
        .profile_service
        .load_profile(identity.principal_id())
        .await?;

    if !can_manage_users(&profile) && !can_manage_notes(&profile) {
        return Err(AppError::Forbidden("admin access required".to_owned()).into());
    }

    Ok(profile)
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|error| AppError::Validation(format!("invalid {what} id: {error}")).into())
}

/// GET /api/admin/users - Every registered profile.
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Json<Vec<ProfileResponse>>> {
    require_admin(&state, &identity).await?;

    let users = state.profile_service.list_users().await?;
    Ok(Json(users.into_iter().map(ProfileResponse::from).collect()))
}

/// PUT /api/admin/users/{profile_id}/role - Replace a user's role.
pub async fn set_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(profile_id): Path<String>,
    Json(payload): Json<SetRoleRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    require_admin(&state, &identity).await?;

    let profile_id = ProfileId::from_uuid(parse_id(&profile_id, "profile")?);
    let role = Role::from_str(&payload.role)?;

    let updated = state.profile_service.set_role(profile_id, role).await?;
    Ok(Json(updated.into()))
}

/// DELETE /api/admin/users/{profile_id} - Remove a profile.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(profile_id): Path<String>,
) -> ApiResult<StatusCode> {
    let admin = require_admin(&state, &identity).await?;

    let profile_id = ProfileId::from_uuid(parse_id(&profile_id, "profile")?);
    if admin.id() == profile_id {
        return Err(AppError::Validation("you cannot delete your own profile".to_owned()).into());
    }

    state.profile_service.delete_profile(profile_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/notes - The full catalogue regardless of visibility.
pub async fn list_all_notes_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    require_admin(&state, &identity).await?;

    let notes = state.note_service.list_all().await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// DELETE /api/admin/notes/{note_id} - Remove a note and its stored file.
pub async fn delete_note_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(note_id): Path<String>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity).await?;

    let note_id = NoteId::from_uuid(parse_id(&note_id, "note")?);
    state.note_service.delete_note(note_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
