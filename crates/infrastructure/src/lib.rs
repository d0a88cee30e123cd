//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_service;
mod fs_object_store;
mod in_memory_identity_provider;
mod in_memory_note_repository;
mod in_memory_object_store;
mod in_memory_profile_repository;
mod postgres_identity_provider;
mod postgres_note_repository;
mod postgres_profile_repository;
mod smtp_email_service;
mod verification_mail;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_email_service::ConsoleEmailService;
pub use fs_object_store::FsObjectStore;
pub use in_memory_identity_provider::InMemoryIdentityProvider;
pub use in_memory_note_repository::InMemoryNoteRepository;
pub use in_memory_object_store::InMemoryObjectStore;
pub use in_memory_profile_repository::InMemoryProfileRepository;
pub use postgres_identity_provider::PostgresIdentityProvider;
pub use postgres_note_repository::PostgresNoteRepository;
pub use postgres_profile_repository::PostgresProfileRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
