//! Owner-facing profile handlers.

use axum::Json;
use axum::extract::{Extension, State};
use notenest_core::SessionIdentity;
use notenest_domain::ProfilePatch;

use crate::dto::{ProfileResponse, UpdateProfileRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/profile - The caller's own profile.
pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profile_service
        .load_profile(identity.principal_id())
        .await?;

    Ok(Json(profile.into()))
}

/// PUT /api/profile - Patch the caller's own profile.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let patch = ProfilePatch {
        full_name: payload.full_name,
        phone: payload.phone,
        department: payload.department,
        subjects: payload.subjects,
    };

    let updated = state
        .profile_service
        .update_profile(identity.principal_id(), patch)
        .await?;

    Ok(Json(updated.into()))
}
