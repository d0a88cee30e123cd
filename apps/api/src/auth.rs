//! Session lifecycle handlers: register, login, logout, verify email.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use notenest_core::{AppError, SessionIdentity};
use notenest_domain::{ProfileSeed, Role};
use tower_sessions::Session;

use crate::dto::{
    GenericMessageResponse, LoginRequest, MeResponse, PrincipalResponse, RegisterRequest,
    VerifyEmailRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Session key holding the authenticated [`SessionIdentity`].
pub const SESSION_USER_KEY: &str = "notenest.identity";

/// POST /auth/register - Create an account plus its profile.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    if payload.password != payload.confirm_password {
        return Err(AppError::Validation("passwords do not match".to_owned()).into());
    }

    let role = Role::from_str(&payload.role)?;
    let seed = ProfileSeed::new(
        payload.full_name,
        payload.phone,
        payload.department,
        role,
        payload.subjects,
    )?;

    state
        .session_service
        .sign_up(&payload.email, &payload.password, &seed)
        .await?;

    Ok(Json(GenericMessageResponse {
        message: "account created; a verification link has been emailed to you".to_owned(),
    }))
}

/// POST /auth/login - Authenticate and establish the session cookie.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<PrincipalResponse>> {
    let principal = state
        .session_service
        .sign_in(&payload.email, &payload.password)
        .await?;

    let identity = SessionIdentity::new(principal.id, &principal.email, principal.verified);

    // OWASP Session Management: regenerate session ID on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    Ok(Json(PrincipalResponse::from(principal)))
}

/// POST /auth/logout - Drop the cookie session.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    let identity = session
        .get::<SessionIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(identity) = identity {
        state
            .session_service
            .sign_out(identity.principal_id())
            .await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/verify-email - Confirm an address from an emailed token.
pub async fn verify_email_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<VerifyEmailRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let principal = state.session_service.confirm_email(&payload.token).await?;

    // Refresh the verified flag if this browser is already signed in.
    let identity = session
        .get::<SessionIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;
    if let Some(identity) = identity
        && identity.principal_id() == principal.id
    {
        let refreshed = SessionIdentity::new(principal.id, &principal.email, principal.verified);
        session
            .insert(SESSION_USER_KEY, &refreshed)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to persist session identity: {error}"))
            })?;
    }

    Ok(Json(GenericMessageResponse {
        message: "email address verified".to_owned(),
    }))
}

/// GET /api/me - The session's principal and profile, when one exists.
///
/// A principal without a loadable profile is reported as such rather than
/// treated as signed out; route guards stay fail-closed either way.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Json<MeResponse>> {
    let profile = match state
        .profile_service
        .load_profile(identity.principal_id())
        .await
    {
        Ok(profile) => Some(profile),
        Err(notenest_core::ProfileError::NotFound) => None,
        Err(error) => return Err(error.into()),
    };

    Ok(Json(MeResponse {
        principal: PrincipalResponse::from(identity),
        profile: profile.map(Into::into),
    }))
}
