//! Application services and ports.

#![forbid(unsafe_code)]

mod identity_service;
mod note_service;
mod profile_service;
mod session_context;

pub use identity_service::{
    EmailService, IdentityProvider, PasswordHasher, Principal, SessionService,
};
pub use note_service::{CatalogueQuery, NoteRepository, NoteService, ObjectStore};
pub use profile_service::{ProfileRepository, ProfileService};
pub use session_context::{ProfileLoadTicket, SessionContext, SessionSnapshot};
