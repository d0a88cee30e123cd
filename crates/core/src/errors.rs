use thiserror::Error;

use crate::AppError;

/// Failures at the identity-provider boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password did not match a known identity. Deliberately
    /// generic so that unknown-email and wrong-password are
    /// indistinguishable to the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-up attempted with an email that already has an identity.
    #[error("an account with this email address already exists")]
    EmailAlreadyRegistered,

    /// The email address has not been verified yet.
    #[error("email address has not been verified")]
    UnverifiedEmail,

    /// The identity provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    Network(String),

    /// Store-originated failure surfaced verbatim.
    #[error(transparent)]
    Store(#[from] AppError),
}

/// Failures while resolving or mutating a Profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No Profile exists for the principal. Treated as unauthenticated
    /// for authorization purposes (fail-closed).
    #[error("no profile found for this account")]
    NotFound,

    /// A faculty Profile must keep at least one subject.
    #[error("faculty profiles require at least one subject")]
    FacultyRequiresSubject,

    /// Store-originated failure surfaced verbatim.
    #[error(transparent)]
    Store(#[from] AppError),
}

/// Failures in the upload pipeline.
///
/// Variants after `StorageWriteFailed` distinguish whether earlier steps
/// already committed side effects: a blob stored before the failure stays
/// orphaned, the pipeline never compensates.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The caller is not permitted to upload notes.
    #[error("only faculty with at least one subject may upload notes")]
    NotPermitted,

    /// The file exceeds the size ceiling. Rejected before any I/O.
    #[error("file size {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Storing the blob failed; no metadata row was created.
    #[error("failed to store file: {0}")]
    StorageWriteFailed(String),

    /// The stored blob could not be resolved to a public locator; the
    /// blob is orphaned in storage.
    #[error("failed to resolve a public locator for the stored file: {0}")]
    LocatorUnavailable(String),

    /// Inserting the metadata row failed; the stored blob is orphaned.
    #[error("failed to record note metadata: {0}")]
    MetadataWriteFailed(String),

    /// Store-originated failure surfaced verbatim.
    #[error(transparent)]
    Store(#[from] AppError),
}

#[cfg(test)]
mod tests {
    use super::UploadError;

    #[test]
    fn file_too_large_names_both_sizes() {
        let error = UploadError::FileTooLarge {
            size: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024,
        };
        let message = error.to_string();
        assert!(message.contains("6291456"));
        assert!(message.contains("5242880"));
    }
}
