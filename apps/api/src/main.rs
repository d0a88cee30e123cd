//! NoteNest API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use notenest_application::{
    EmailService, IdentityProvider, NoteRepository, NoteService, ObjectStore, ProfileRepository,
    ProfileService, SessionService,
};
use notenest_core::AppError;
use notenest_domain::MAX_NOTE_FILE_BYTES;
use notenest_infrastructure::{
    Argon2PasswordHasher, ConsoleEmailService, FsObjectStore, PostgresIdentityProvider,
    PostgresNoteRepository, PostgresProfileRepository, SmtpEmailConfig, SmtpEmailService,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");

    let storage_root = env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_owned());
    let storage_public_url = env::var("STORAGE_PUBLIC_URL")
        .unwrap_or_else(|_| format!("http://{api_host}:{api_port}/files"));
    let storage_public_url = Url::parse(&storage_public_url)
        .map_err(|error| AppError::Validation(format!("invalid STORAGE_PUBLIC_URL: {error}")))?;

    let email_provider = env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "console".to_owned());

    // Verification links land on the frontend, which posts the token back.
    let verify_base_url = Url::parse(&frontend_url)
        .and_then(|base| base.join("/verify-email"))
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let email_service: Arc<dyn EmailService> = match email_provider.as_str() {
        "smtp" => {
            let smtp_port = required_non_empty_env("SMTP_PORT")?
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;

            let smtp_config = SmtpEmailConfig {
                host: required_non_empty_env("SMTP_HOST")?,
                port: smtp_port,
                username: required_non_empty_env("SMTP_USERNAME")?,
                password: required_non_empty_env("SMTP_PASSWORD")?,
                from_address: required_non_empty_env("SMTP_FROM_ADDRESS")?,
            };
            Arc::new(SmtpEmailService::new(smtp_config)?)
        }
        "console" => Arc::new(ConsoleEmailService::new()),
        _ => {
            return Err(AppError::Validation(format!(
                "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{email_provider}'"
            )));
        }
    };

    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let identity_provider: Arc<dyn IdentityProvider> = Arc::new(PostgresIdentityProvider::new(
        pool.clone(),
        password_hasher,
        email_service,
        verify_base_url,
    ));
    let profile_repository: Arc<dyn ProfileRepository> =
        Arc::new(PostgresProfileRepository::new(pool.clone()));
    let note_repository: Arc<dyn NoteRepository> = Arc::new(PostgresNoteRepository::new(pool));
    let object_store: Arc<dyn ObjectStore> =
        Arc::new(FsObjectStore::new(&storage_root, storage_public_url)?);

    let app_state = AppState {
        session_service: SessionService::new(identity_provider, profile_repository.clone()),
        profile_service: ProfileService::new(profile_repository.clone()),
        note_service: NoteService::new(object_store, note_repository, profile_repository),
        frontend_url: frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route("/api/me", get(auth::me_handler))
        .route(
            "/api/profile",
            get(handlers::profile::get_profile_handler)
                .put(handlers::profile::update_profile_handler),
        )
        .route(
            "/api/notes",
            get(handlers::notes::list_notes_handler).post(handlers::notes::upload_note_handler),
        )
        .route(
            "/api/notes/facets",
            get(handlers::notes::note_facets_handler),
        )
        .route("/api/admin/users", get(handlers::admin::list_users_handler))
        .route(
            "/api/admin/users/{profile_id}/role",
            put(handlers::admin::set_role_handler),
        )
        .route(
            "/api/admin/users/{profile_id}",
            delete(handlers::admin::delete_user_handler),
        )
        .route(
            "/api/admin/notes",
            get(handlers::admin::list_all_notes_handler),
        )
        .route(
            "/api/admin/notes/{note_id}",
            delete(handlers::admin::delete_note_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    // Room for the 5 MiB file plus multipart framing and text fields.
    let body_limit = DefaultBodyLimit::max((MAX_NOTE_FILE_BYTES as usize) + 1024 * 1024);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/verify-email", post(auth::verify_email_handler))
        .merge(protected_routes)
        .nest_service("/files", ServeDir::new(&storage_root))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "notenest-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
