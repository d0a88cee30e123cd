//! Process-wide observable for a single logical client session.
//!
//! Replaces ambient mutable session globals with an explicit
//! subscribe/notify contract: observers receive [`SessionSnapshot`] values
//! through a watch channel. `loading = true` means authorization-pending,
//! never granted or denied; callers must wait for resolution before
//! trusting any guard decision.

use notenest_core::PrincipalId;
use notenest_domain::Profile;
use tokio::sync::watch;

use crate::Principal;

/// Point-in-time view of the session.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// The authenticated principal, if any.
    pub principal: Option<Principal>,
    /// The resolved profile for the principal, once loaded.
    pub profile: Option<Profile>,
    /// True from the moment a principal is observed until its profile
    /// resolves or fails.
    pub loading: bool,
}

/// Ticket tying an in-flight profile load to the principal it was issued
/// for. A resolution carrying a stale ticket is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLoadTicket {
    principal_id: PrincipalId,
}

impl ProfileLoadTicket {
    /// Returns the principal the load was started for.
    #[must_use]
    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }
}

/// Shared session state with explicit init and teardown.
#[derive(Debug)]
pub struct SessionContext {
    sender: watch::Sender<SessionSnapshot>,
}

impl SessionContext {
    /// Initializes the context with a signed-out snapshot.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(SessionSnapshot::default());
        Self { sender }
    }

    /// Subscribes to snapshot changes. The first observation is the
    /// current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.sender.subscribe()
    }

    /// Returns a clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.sender.borrow().clone()
    }

    /// Records a newly authenticated principal and marks the profile load
    /// as in flight. Returns the ticket the eventual resolution must
    /// present.
    pub fn principal_observed(&self, principal: Principal) -> ProfileLoadTicket {
        let ticket = ProfileLoadTicket {
            principal_id: principal.id,
        };

        self.sender.send_modify(|snapshot| {
            snapshot.principal = Some(principal);
            snapshot.profile = None;
            snapshot.loading = true;
        });

        ticket
    }

    /// Publishes a profile load result.
    ///
    /// A `None` profile resolves the load as failed: the session stays
    /// unauthenticated for authorization purposes (fail-closed). If the
    /// principal changed or signed out since the ticket was issued, the
    /// result is stale and silently discarded.
    pub fn profile_resolved(&self, ticket: ProfileLoadTicket, profile: Option<Profile>) {
        self.sender.send_modify(|snapshot| {
            let current = snapshot
                .principal
                .as_ref()
                .map(|principal| principal.id);
            if current != Some(ticket.principal_id) {
                return;
            }

            snapshot.profile = profile;
            snapshot.loading = false;
        });
    }

    /// Teardown: clears the principal and profile. Any in-flight load
    /// from the prior principal becomes stale.
    pub fn sign_out(&self) {
        self.sender.send_modify(|snapshot| {
            *snapshot = SessionSnapshot::default();
        });
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use notenest_core::PrincipalId;
    use notenest_domain::{Profile, ProfileId, Role, protected_access};

    use crate::Principal;

    use super::SessionContext;

    fn principal() -> Principal {
        Principal {
            id: PrincipalId::new(),
            email: "grace@example.edu".to_owned(),
            verified: true,
        }
    }

    fn profile_for(principal: &Principal) -> Profile {
        Profile::new(
            ProfileId::new(),
            principal.id,
            "Grace Hopper",
            &principal.email,
            None,
            "Computer Science",
            Role::Faculty,
            vec!["Algorithms".to_owned()],
            Utc::now(),
            Utc::now(),
        )
        .unwrap_or_else(|_| panic!("profile"))
    }

    #[test]
    fn first_subscriber_sees_signed_out_state() {
        let context = SessionContext::new();
        let receiver = context.subscribe();
        let snapshot = receiver.borrow();
        assert!(snapshot.principal.is_none());
        assert!(!snapshot.loading);
    }

    #[test]
    fn observing_a_principal_starts_loading() {
        let context = SessionContext::new();
        let _ticket = context.principal_observed(principal());

        let snapshot = context.snapshot();
        assert!(snapshot.principal.is_some());
        assert!(snapshot.profile.is_none());
        assert!(snapshot.loading);
        // While loading, guards report pending, not denied.
        assert!(matches!(
            protected_access(snapshot.profile.as_ref(), snapshot.loading),
            notenest_domain::AccessDecision::Pending
        ));
    }

    #[test]
    fn resolution_publishes_profile_and_clears_loading() {
        let context = SessionContext::new();
        let current = principal();
        let ticket = context.principal_observed(current.clone());
        context.profile_resolved(ticket, Some(profile_for(&current)));

        let snapshot = context.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.profile.is_some());
    }

    #[test]
    fn failed_resolution_is_fail_closed() {
        let context = SessionContext::new();
        let ticket = context.principal_observed(principal());
        context.profile_resolved(ticket, None);

        let snapshot = context.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.profile.is_none());
        assert!(matches!(
            protected_access(snapshot.profile.as_ref(), snapshot.loading),
            notenest_domain::AccessDecision::Denied
        ));
    }

    #[test]
    fn sign_out_invalidates_in_flight_load() {
        let context = SessionContext::new();
        let prior = principal();
        let stale_ticket = context.principal_observed(prior.clone());

        context.sign_out();
        context.profile_resolved(stale_ticket, Some(profile_for(&prior)));

        let snapshot = context.snapshot();
        assert!(snapshot.principal.is_none());
        assert!(snapshot.profile.is_none());
        assert!(!snapshot.loading);
    }

    #[test]
    fn superseding_principal_discards_prior_load() {
        let context = SessionContext::new();
        let first = principal();
        let stale_ticket = context.principal_observed(first.clone());

        let second = principal();
        let fresh_ticket = context.principal_observed(second.clone());

        // The stale resolution lands after the principal changed.
        context.profile_resolved(stale_ticket, Some(profile_for(&first)));
        let snapshot = context.snapshot();
        assert!(snapshot.loading);
        assert!(snapshot.profile.is_none());

        context.profile_resolved(fresh_ticket, Some(profile_for(&second)));
        let snapshot = context.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.profile.map(|profile| profile.principal_id()),
            Some(second.id)
        );
    }

    #[tokio::test]
    async fn subscribers_are_notified_of_changes() {
        let context = SessionContext::new();
        let mut receiver = context.subscribe();

        context.principal_observed(principal());
        receiver
            .changed()
            .await
            .unwrap_or_else(|_| panic!("watch closed"));
        assert!(receiver.borrow().loading);
    }
}
