//! Shared composition of the address verification email.
//!
//! Both identity providers send the same mail; only the token transport
//! (hash at rest, plaintext in the mail) lives here.

use sha2::{Digest, Sha256};
use url::Url;

use notenest_application::EmailService;
use notenest_core::AuthError;

/// Subject line of the verification mail.
pub(crate) const VERIFICATION_SUBJECT: &str = "Verify your NoteNest email address";

/// Returns the hex digest stored in place of a verification token.
///
/// Only the digest is persisted, so a leaked identity store cannot be
/// replayed into confirmed accounts.
pub(crate) fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Sends the verification mail carrying the plaintext token link.
pub(crate) async fn send_verification(
    email_service: &dyn EmailService,
    verify_base_url: &Url,
    to: &str,
    token: &str,
) -> Result<(), AuthError> {
    let mut link = verify_base_url.clone();
    link.query_pairs_mut().append_pair("token", token);

    let body = format!(
        "Welcome to NoteNest.\n\n\
         Confirm your email address by opening the link below:\n\n{link}\n\n\
         If you did not create this account, ignore this message."
    );

    email_service
        .send_email(to, VERIFICATION_SUBJECT, &body, None)
        .await
        .map_err(|error| AuthError::Network(format!("failed to send verification mail: {error}")))
}

#[cfg(test)]
mod tests {
    use super::token_digest;

    #[test]
    fn digest_is_stable_and_hex() {
        let digest = token_digest("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, token_digest("abc"));
        assert_ne!(digest, token_digest("abd"));
    }
}
