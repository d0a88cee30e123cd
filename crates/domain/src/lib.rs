//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod authorization;
mod note;
mod profile;
mod visibility;

pub use authorization::{
    AccessDecision, admin_access, can_manage_notes, can_manage_users, can_upload, protected_access,
};
pub use note::{FileUpload, MAX_NOTE_FILE_BYTES, Note, NoteDraft, NoteId};
pub use profile::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, Profile, ProfileId, ProfilePatch,
    ProfileSeed, Role, validate_password,
};
pub use visibility::{
    FilterFacets, available_filter_facets, filter_by_department, filter_by_search,
    filter_by_subject, visible_notes,
};
