use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::{
    catalog::ContentCatalog,
    domain::UserId,
    errors::Error,
    ports::{Membership, MembershipPort},
    session::SessionStore,
    Result,
};

/// Why a request was declined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// The user is not subscribed to the required channel.
    NotSubscribed,
    /// The membership lookup failed or timed out. Denying is retryable;
    /// granting on uncertainty would be irreversible.
    LookupFailed,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSubscribed => write!(f, "not subscribed"),
            Self::LookupFailed => write!(f, "membership lookup failed"),
        }
    }
}

/// Outcome of an entitlement check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entitlement {
    Granted,
    AlreadyReceived,
    Denied(DenyReason),
}

/// Decides whether a user may receive a guide right now.
///
/// Policy: one guide per user, ever, regardless of key; membership is
/// re-verified on every request; lookup failure denies (fail-closed).
/// This gate never mutates anything: the grant flag is set only after a
/// confirmed delivery, by the distributor.
pub struct EntitlementGate {
    catalog: Arc<ContentCatalog>,
    sessions: Arc<SessionStore>,
    membership: Arc<dyn MembershipPort>,
    channel: String,
    lookup_timeout: Duration,
}

impl EntitlementGate {
    pub fn new(
        catalog: Arc<ContentCatalog>,
        sessions: Arc<SessionStore>,
        membership: Arc<dyn MembershipPort>,
        channel: impl Into<String>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            sessions,
            membership,
            channel: channel.into(),
            lookup_timeout,
        }
    }

    pub async fn check(&self, user: UserId, key: &str) -> Result<Entitlement> {
        if !self.catalog.contains(key) {
            return Err(Error::NotFound(key.to_string()));
        }

        // One guide ever, whichever key is asked for.
        if self.sessions.is_granted(user).await {
            return Ok(Entitlement::AlreadyReceived);
        }

        match timeout(
            self.lookup_timeout,
            self.membership.get_membership(&self.channel, user),
        )
        .await
        {
            Ok(Ok(Membership::Member)) => Ok(Entitlement::Granted),
            Ok(Ok(Membership::NotMember)) => Ok(Entitlement::Denied(DenyReason::NotSubscribed)),
            Ok(Err(e)) => {
                tracing::warn!("membership lookup failed for {}: {e}", user.0);
                Ok(Entitlement::Denied(DenyReason::LookupFailed))
            }
            Err(_) => {
                tracing::warn!("membership lookup timed out for {}", user.0);
                Ok(Entitlement::Denied(DenyReason::LookupFailed))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Scriptable membership port for tests.
    pub(crate) struct FakeMembership {
        pub result: std::sync::Mutex<Result<Membership>>,
        pub calls: AtomicUsize,
    }

    impl FakeMembership {
        pub fn member() -> Self {
            Self::with(Ok(Membership::Member))
        }

        pub fn not_member() -> Self {
            Self::with(Ok(Membership::NotMember))
        }

        pub fn failing() -> Self {
            Self::with(Err(Error::External("lookup exploded".to_string())))
        }

        pub fn with(result: Result<Membership>) -> Self {
            Self {
                result: std::sync::Mutex::new(result),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn set(&self, result: Result<Membership>) {
            *self.result.lock().unwrap() = result;
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MembershipPort for FakeMembership {
        async fn get_membership(&self, _group: &str, _user: UserId) -> Result<Membership> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &*self.result.lock().unwrap() {
                Ok(m) => Ok(*m),
                Err(e) => Err(Error::External(format!("{e}"))),
            }
        }
    }

    fn gate(membership: Arc<FakeMembership>, sessions: Arc<SessionStore>) -> EntitlementGate {
        EntitlementGate::new(
            Arc::new(ContentCatalog::builtin(Path::new("assets")).unwrap()),
            sessions,
            membership,
            "@channel",
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn member_is_granted() {
        let g = gate(
            Arc::new(FakeMembership::member()),
            Arc::new(SessionStore::new(None)),
        );
        let got = g.check(UserId(1), "path_to_self").await.unwrap();
        assert_eq!(got, Entitlement::Granted);
    }

    #[tokio::test]
    async fn non_member_is_denied() {
        let g = gate(
            Arc::new(FakeMembership::not_member()),
            Arc::new(SessionStore::new(None)),
        );
        let got = g.check(UserId(1), "path_to_self").await.unwrap();
        assert_eq!(got, Entitlement::Denied(DenyReason::NotSubscribed));
    }

    #[tokio::test]
    async fn lookup_failure_denies_fail_closed() {
        let g = gate(
            Arc::new(FakeMembership::failing()),
            Arc::new(SessionStore::new(None)),
        );
        let got = g.check(UserId(1), "path_to_self").await.unwrap();
        assert_eq!(got, Entitlement::Denied(DenyReason::LookupFailed));
    }

    #[tokio::test]
    async fn unknown_key_is_not_found_not_denied() {
        let g = gate(
            Arc::new(FakeMembership::member()),
            Arc::new(SessionStore::new(None)),
        );
        let err = g.check(UserId(1), "no_such_guide").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn already_granted_short_circuits_without_a_lookup() {
        let membership = Arc::new(FakeMembership::member());
        let sessions = Arc::new(SessionStore::new(None));
        assert!(sessions.try_reserve_grant(UserId(1)).await);
        sessions.commit_grant(UserId(1)).await;

        let g = gate(membership.clone(), sessions);
        let got = g.check(UserId(1), "self_acceptance").await.unwrap();
        assert_eq!(got, Entitlement::AlreadyReceived);
        assert_eq!(membership.call_count(), 0);
    }
}
