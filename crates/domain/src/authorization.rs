//! Pure authorization predicates over the resolved profile state.
//!
//! A closed set of named checks replaces role-string comparisons at call
//! sites. Every gated view follows the same state machine:
//! Loading -> {Allowed, Denied}. Denied is terminal for a render pass; the
//! caller re-evaluates on the next profile change.

use crate::profile::{Profile, Role};

/// Outcome of a gated access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Profile resolution is still in flight: neither allow nor deny.
    Pending,
    /// Access granted for this render pass.
    Allowed,
    /// Access denied; the caller redirects rather than erroring.
    Denied,
}

impl AccessDecision {
    /// Returns whether the decision grants access.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Gate for any authenticated surface: pending while loading, allowed iff
/// a profile resolved. A failed profile load leaves `profile` empty and is
/// therefore denied (fail-closed).
#[must_use]
pub fn protected_access(profile: Option<&Profile>, loading: bool) -> AccessDecision {
    if loading {
        return AccessDecision::Pending;
    }

    match profile {
        Some(_) => AccessDecision::Allowed,
        None => AccessDecision::Denied,
    }
}

/// Gate for the admin surface: allowed iff the resolved profile is an
/// admin; every other state (including no profile at all) is denied.
#[must_use]
pub fn admin_access(profile: Option<&Profile>, loading: bool) -> AccessDecision {
    if loading {
        return AccessDecision::Pending;
    }

    match profile {
        Some(profile) if profile.role() == Role::Admin => AccessDecision::Allowed,
        _ => AccessDecision::Denied,
    }
}

/// Whether the profile may upload notes: faculty with at least one
/// subject. A faculty profile without subjects exists validly but cannot
/// upload (fail-closed asymmetry).
#[must_use]
pub fn can_upload(profile: &Profile) -> bool {
    profile.role() == Role::Faculty && !profile.subjects().is_empty()
}

/// Whether the profile may manage user accounts.
#[must_use]
pub fn can_manage_users(profile: &Profile) -> bool {
    profile.role() == Role::Admin
}

/// Whether the profile may manage the full note catalogue.
#[must_use]
pub fn can_manage_notes(profile: &Profile) -> bool {
    profile.role() == Role::Admin
}
