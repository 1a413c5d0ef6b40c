use async_trait::async_trait;

use crate::{domain::UserId, Result};

/// Current membership of a user in the gated channel.
///
/// Fetched on demand and never cached: a user's membership can change
/// between requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Membership {
    Member,
    NotMember,
}

/// Port for the external membership lookup (Telegram `getChatMember`).
///
/// May be slow or fail; the entitlement gate wraps calls in a timeout and
/// treats any failure as "unknown" (which denies, fail-closed).
#[async_trait]
pub trait MembershipPort: Send + Sync {
    async fn get_membership(&self, group: &str, user: UserId) -> Result<Membership>;
}
