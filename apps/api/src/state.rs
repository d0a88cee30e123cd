use notenest_application::{NoteService, ProfileService, SessionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub profile_service: ProfileService,
    pub note_service: NoteService,
    pub frontend_url: String,
}
