//! Argon2id implementation of the password hashing port.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use notenest_application::PasswordHasher as PasswordHasherPort;
use notenest_core::{AppError, AppResult};

/// Argon2id hasher used for account credentials.
///
/// Identity providers also run it against a throwaway input when an email
/// is unknown, so sign-in latency does not reveal whether an account
/// exists.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with OWASP Password Storage parameters
    /// (Argon2id, m=19456, t=2, p=1).
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(19456, 2, 1, None).unwrap_or_else(|_| Params::default());

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("failed to parse password hash: {error}"))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notenest_application::PasswordHasher as PasswordHasherPort;
    use notenest_core::AppResult;

    #[test]
    fn correct_password_verifies() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("hunter2hunter2")?;
        assert!(hasher.verify_password("hunter2hunter2", &hash)?);
        Ok(())
    }

    #[test]
    fn wrong_password_does_not_verify() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("hunter2hunter2")?;
        assert!(!hasher.verify_password("hunter3", &hash)?);
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash_password("hunter2hunter2")?;
        let second = hasher.hash_password("hunter2hunter2")?;
        assert_ne!(first, second);
        Ok(())
    }
}
