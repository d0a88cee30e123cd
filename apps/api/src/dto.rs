//! Request and response payloads for the HTTP surface.

use notenest_application::Principal;
use notenest_core::SessionIdentity;
use notenest_domain::{FilterFacets, Note, Profile};
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Generic acknowledgement payload.
#[derive(Debug, Serialize)]
pub struct GenericMessageResponse {
    pub message: String,
}

/// Incoming payload for account registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub department: String,
    pub role: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Incoming payload for email verification.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// API representation of the signed-in principal.
#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: String,
    pub email: String,
    pub verified: bool,
}

impl From<Principal> for PrincipalResponse {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            email: principal.email,
            verified: principal.verified,
        }
    }
}

impl From<SessionIdentity> for PrincipalResponse {
    fn from(identity: SessionIdentity) -> Self {
        Self {
            id: identity.principal_id().to_string(),
            email: identity.email().to_owned(),
            verified: identity.verified(),
        }
    }
}

/// API representation of a profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub role: String,
    pub subjects: Vec<String>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id().to_string(),
            full_name: profile.full_name().to_owned(),
            email: profile.email().to_owned(),
            phone: profile.phone().map(ToOwned::to_owned),
            department: profile.department().to_owned(),
            role: profile.role().as_str().to_owned(),
            subjects: profile.subjects().to_vec(),
        }
    }
}

/// Session payload: principal plus the profile when one exists.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub principal: PrincipalResponse,
    pub profile: Option<ProfileResponse>,
}

/// Incoming payload for owner profile edits. Absent fields stay as-is.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub subjects: Option<Vec<String>>,
}

/// Incoming payload for an admin role change.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// Query parameters refining the note listing.
#[derive(Debug, Default, Deserialize)]
pub struct NoteListQuery {
    pub search: Option<String>,
    pub subject: Option<String>,
    pub department: Option<String>,
}

/// API representation of a catalogue note.
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub department: String,
    pub file_url: String,
    pub file_name: String,
    pub file_size: Option<u64>,
    pub uploaded_by: String,
    pub uploader_name: Option<String>,
    pub created_at: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id().to_string(),
            title: note.title().to_owned(),
            description: note.description().map(ToOwned::to_owned),
            subject: note.subject().to_owned(),
            department: note.department().to_owned(),
            file_url: note.file_url().to_string(),
            file_name: note.file_name().to_owned(),
            file_size: note.file_size(),
            uploaded_by: note.uploaded_by().to_string(),
            uploader_name: note.uploader_name().map(ToOwned::to_owned),
            created_at: note.created_at().to_rfc3339(),
        }
    }
}

/// Filter facet response: distinct departments and subjects drawn from
/// faculty profiles.
#[derive(Debug, Serialize)]
pub struct FacetsResponse {
    pub departments: Vec<String>,
    pub subjects: Vec<String>,
}

impl From<FilterFacets> for FacetsResponse {
    fn from(facets: FilterFacets) -> Self {
        Self {
            departments: facets.departments().to_vec(),
            subjects: facets.subjects().to_vec(),
        }
    }
}
