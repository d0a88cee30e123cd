use serde::{Deserialize, Serialize};

use crate::PrincipalId;

/// Principal information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    principal_id: PrincipalId,
    email: String,
    verified: bool,
}

impl SessionIdentity {
    /// Creates a session identity from provider claims.
    #[must_use]
    pub fn new(principal_id: PrincipalId, email: impl Into<String>, verified: bool) -> Self {
        Self {
            principal_id,
            email: email.into(),
            verified,
        }
    }

    /// Returns the stable principal identifier from the identity provider.
    #[must_use]
    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    /// Returns the email claim cached at sign-in.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns whether the provider has verified the email address.
    ///
    /// Surfaced as-is; enforcement of verification policy belongs to the
    /// identity provider, not to this core.
    #[must_use]
    pub fn verified(&self) -> bool {
        self.verified
    }
}
