use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{QuestionId, UserId};

/// What the user is applying for via the "leave an application" buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationTopic {
    Mentorship,
    Consultation,
}

/// Where a user currently is in the interaction flow.
///
/// Drives which inputs are valid; everything else about a user lives in
/// [`UserSession`] fields that survive stage changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Idle,
    ChoosingMode,
    SelectingVariant,
    AfterPick,
    AwaitingComment,
    AwaitingApplication(ApplicationTopic),
    Completed,
}

/// Per-user state. Created lazily on first interaction.
///
/// `content_granted` is permanent once set (and persisted, see
/// [`SessionStore::commit_grant`]); the rest is transient flow state.
#[derive(Clone, Debug, Default)]
pub struct UserSession {
    pub stage: Stage,
    pub pending_question: Option<QuestionId>,
    pub pending_choice: Option<String>,
    pub content_granted: bool,
    pub reminder_active: bool,
}

impl UserSession {
    /// Back to the main menu: clear transient flow state, keep the
    /// permanent flags.
    pub fn reset_to_idle(&mut self) {
        self.stage = Stage::Idle;
        self.pending_question = None;
        self.pending_choice = None;
    }
}

#[derive(Default)]
struct StoreInner {
    sessions: HashMap<UserId, Arc<Mutex<UserSession>>>,
    granted: HashSet<i64>,
}

/// The only shared mutable resource in the core.
///
/// Each user gets their own `Arc<Mutex<UserSession>>` entry, so two events
/// for different users never contend, and the registry mutex is held only
/// long enough to fetch/create an entry, never across I/O.
pub struct SessionStore {
    inner: Mutex<StoreInner>,
    grants_file: Option<PathBuf>,
}

impl SessionStore {
    pub fn new(grants_file: Option<PathBuf>) -> Self {
        let granted = grants_file
            .as_deref()
            .map(load_grants)
            .unwrap_or_default();

        Self {
            inner: Mutex::new(StoreInner {
                sessions: HashMap::new(),
                granted,
            }),
            grants_file,
        }
    }

    /// Fetch or lazily create the session entry for a user.
    pub async fn entry(&self, user: UserId) -> Arc<Mutex<UserSession>> {
        let mut inner = self.inner.lock().await;
        let granted = inner.granted.contains(&user.0);
        inner
            .sessions
            .entry(user)
            .or_insert_with(|| {
                Arc::new(Mutex::new(UserSession {
                    content_granted: granted,
                    ..UserSession::default()
                }))
            })
            .clone()
    }

    /// Run a closure against the user's session under its lock.
    pub async fn update<R>(&self, user: UserId, f: impl FnOnce(&mut UserSession) -> R) -> R {
        let entry = self.entry(user).await;
        let mut session = entry.lock().await;
        f(&mut session)
    }

    pub async fn snapshot(&self, user: UserId) -> UserSession {
        self.update(user, |s| s.clone()).await
    }

    pub async fn is_granted(&self, user: UserId) -> bool {
        self.update(user, |s| s.content_granted).await
    }

    /// Compare-and-set on the grant flag: returns `true` for exactly one
    /// caller while the flag is unset. The winner must follow up with
    /// [`commit_grant`](Self::commit_grant) after a successful send or
    /// [`rollback_grant`](Self::rollback_grant) after a failed one.
    pub async fn try_reserve_grant(&self, user: UserId) -> bool {
        self.update(user, |s| {
            if s.content_granted {
                return false;
            }
            s.content_granted = true;
            true
        })
        .await
    }

    /// Undo a reservation whose send failed, so the user can retry.
    pub async fn rollback_grant(&self, user: UserId) {
        self.update(user, |s| s.content_granted = false).await;
    }

    /// Make a reservation permanent and persist it.
    pub async fn commit_grant(&self, user: UserId) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.granted.insert(user.0);
            let mut ids: Vec<i64> = inner.granted.iter().copied().collect();
            ids.sort_unstable();
            ids
        };

        if let Some(path) = &self.grants_file {
            if let Err(e) = save_grants(path, &snapshot) {
                tracing::warn!("failed to persist grant ledger: {e}");
            }
        }
    }

    pub async fn set_reminder_active(&self, user: UserId, active: bool) {
        self.update(user, |s| s.reminder_active = active).await;
    }
}

#[derive(Serialize, Deserialize)]
struct GrantsFile {
    granted: Vec<i64>,
}

fn load_grants(path: &std::path::Path) -> HashSet<i64> {
    let Ok(txt) = std::fs::read_to_string(path) else {
        return HashSet::new();
    };
    match serde_json::from_str::<GrantsFile>(&txt) {
        Ok(data) => data.granted.into_iter().collect(),
        Err(e) => {
            tracing::warn!("ignoring unreadable grant ledger {}: {e}", path.display());
            HashSet::new()
        }
    }
}

fn save_grants(path: &std::path::Path, granted: &[i64]) -> crate::Result<()> {
    let txt = serde_json::to_string(&GrantsFile {
        granted: granted.to_vec(),
    })?;
    std::fs::write(path, txt)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_grants_file() -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        PathBuf::from(format!("/tmp/mindmeld-grants-test-{}-{ts}.json", std::process::id()))
    }

    #[tokio::test]
    async fn sessions_are_created_lazily_with_defaults() {
        let store = SessionStore::new(None);
        let s = store.snapshot(UserId(1)).await;
        assert_eq!(s.stage, Stage::Idle);
        assert!(s.pending_choice.is_none());
        assert!(!s.content_granted);
        assert!(!s.reminder_active);
    }

    #[tokio::test]
    async fn reserve_is_exclusive_until_rollback() {
        let store = SessionStore::new(None);
        let user = UserId(7);

        assert!(store.try_reserve_grant(user).await);
        assert!(!store.try_reserve_grant(user).await);

        store.rollback_grant(user).await;
        assert!(store.try_reserve_grant(user).await);
    }

    #[tokio::test]
    async fn reset_to_idle_keeps_permanent_flags() {
        let store = SessionStore::new(None);
        let user = UserId(3);
        store
            .update(user, |s| {
                s.stage = Stage::AfterPick;
                s.pending_question = Some(QuestionId(2));
                s.pending_choice = Some("5 мин".to_string());
                s.content_granted = true;
                s.reminder_active = true;
            })
            .await;

        store.update(user, |s| s.reset_to_idle()).await;

        let s = store.snapshot(user).await;
        assert_eq!(s.stage, Stage::Idle);
        assert!(s.pending_question.is_none());
        assert!(s.pending_choice.is_none());
        assert!(s.content_granted);
        assert!(s.reminder_active);
    }

    #[tokio::test]
    async fn committed_grants_survive_a_new_store() {
        let path = tmp_grants_file();

        let store = SessionStore::new(Some(path.clone()));
        let user = UserId(42);
        assert!(store.try_reserve_grant(user).await);
        store.commit_grant(user).await;

        let reopened = SessionStore::new(Some(path.clone()));
        assert!(reopened.is_granted(user).await);
        assert!(!reopened.try_reserve_grant(user).await);

        let _ = std::fs::remove_file(&path);
    }
}
