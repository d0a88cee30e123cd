use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notenest_core::{AppError, AuthError, ProfileError, UploadError};
use serde::Serialize;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around the component error types.
#[derive(Debug)]
pub enum ApiError {
    /// Core error carrying its own status mapping.
    App(AppError),
    /// Upload exceeded the file size ceiling (413).
    PayloadTooLarge(String),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        let app_error = match value {
            // Generic message for both unknown email and wrong password.
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("invalid email or password".to_owned())
            }
            AuthError::EmailAlreadyRegistered => {
                AppError::Conflict("an account with this email already exists".to_owned())
            }
            AuthError::UnverifiedEmail => {
                AppError::Forbidden("email address is not verified".to_owned())
            }
            AuthError::Network(message) => AppError::Internal(message),
            AuthError::Store(inner) => inner,
        };
        Self::App(app_error)
    }
}

impl From<ProfileError> for ApiError {
    fn from(value: ProfileError) -> Self {
        let app_error = match value {
            ProfileError::NotFound => AppError::NotFound("profile not found".to_owned()),
            ProfileError::FacultyRequiresSubject => {
                AppError::Validation("faculty profiles need at least one subject".to_owned())
            }
            ProfileError::Store(inner) => inner,
        };
        Self::App(app_error)
    }
}

impl From<UploadError> for ApiError {
    fn from(value: UploadError) -> Self {
        match value {
            UploadError::FileTooLarge { .. } => Self::PayloadTooLarge(value.to_string()),
            UploadError::NotPermitted => Self::App(AppError::Forbidden(
                "only faculty with assigned subjects can upload notes".to_owned(),
            )),
            UploadError::StorageWriteFailed(message)
            | UploadError::LocatorUnavailable(message)
            | UploadError::MetadataWriteFailed(message) => Self::App(AppError::Internal(message)),
            UploadError::Store(inner) => Self::App(inner),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::App(error) => {
                let status = match error {
                    AppError::Validation(_) => StatusCode::BAD_REQUEST,
                    AppError::NotFound(_) => StatusCode::NOT_FOUND,
                    AppError::Conflict(_) => StatusCode::CONFLICT,
                    AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                    AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.to_string())
            }
            Self::PayloadTooLarge(message) => (StatusCode::PAYLOAD_TOO_LARGE, message),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
