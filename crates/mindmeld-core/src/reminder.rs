//! Per-user daily reminder jobs.
//!
//! One tokio task per user, registered in a map so re-scheduling replaces
//! (never duplicates) the previous job and cancellation is synchronous:
//! once `cancel` returns, the token is cancelled and the task aborted, so
//! no further fires can occur.
//!
//! Fire time is a wall-clock `HH:MM` in a named IANA zone. The next
//! occurrence is recomputed before every sleep, so the job keeps firing at
//! the same local time across DST transitions.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::{DateTime, Duration as ChronoDuration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::{sync::Mutex, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::{
    callback::{CallbackEvent, QodEvent},
    domain::{ChatId, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    session::SessionStore,
};

const REMINDER_TEXT: &str = "Вопрос дня ✨";

struct JobEntry {
    id: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    at: NaiveTime,
    tz: Tz,
    sessions: Arc<SessionStore>,
    messenger: Arc<dyn MessagingPort>,
    jobs: Mutex<HashMap<UserId, JobEntry>>,
    next_job_id: AtomicU64,
}

impl ReminderScheduler {
    pub fn new(
        at: NaiveTime,
        tz: Tz,
        sessions: Arc<SessionStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                at,
                tz,
                sessions,
                messenger,
                jobs: Mutex::new(HashMap::new()),
                next_job_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn fire_time(&self) -> NaiveTime {
        self.inner.at
    }

    /// Schedule (or re-schedule) the daily reminder for a user.
    /// Re-invoking replaces the existing job: cancel-then-create.
    pub async fn schedule(&self, user: UserId) {
        let id = self.inner.next_job_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();

        let inner = self.inner.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            job_loop(inner, user, id, token).await;
        });

        let prev = {
            let mut jobs = self.inner.jobs.lock().await;
            jobs.insert(user, JobEntry { id, cancel, handle })
        };
        if let Some(prev) = prev {
            prev.cancel.cancel();
            prev.handle.abort();
        }

        self.inner.sessions.set_reminder_active(user, true).await;
    }

    /// Cancel the user's reminder. Returns `false` if none was active.
    pub async fn cancel(&self, user: UserId) -> bool {
        let prev = self.inner.jobs.lock().await.remove(&user);
        let Some(prev) = prev else {
            return false;
        };
        prev.cancel.cancel();
        prev.handle.abort();
        self.inner.sessions.set_reminder_active(user, false).await;
        true
    }

    pub async fn active_count(&self) -> usize {
        self.inner.jobs.lock().await.len()
    }
}

async fn job_loop(inner: Arc<SchedulerInner>, user: UserId, job_id: u64, cancel: CancellationToken) {
    loop {
        let now = Utc::now().with_timezone(&inner.tz);
        let Some(next) = next_occurrence(now, inner.at) else {
            tracing::warn!("no next reminder occurrence for {}; stopping job", user.0);
            break;
        };
        let dur = (next - now).to_std().unwrap_or_default();

        tokio::select! {
          _ = cancel.cancelled() => break,
          _ = sleep(dur) => {
            let keyboard = InlineKeyboard::new(vec![vec![InlineButton::callback(
                "Ответить сейчас",
                CallbackEvent::Qod(QodEvent::Start).encode(),
            )]]);
            let sent = inner
                .messenger
                .send_html(ChatId(user.0), REMINDER_TEXT, Some(keyboard))
                .await;

            if let Err(e) = sent {
                if is_unreachable_error(&e) {
                    // The user blocked the bot or the chat is gone; prune
                    // instead of retrying forever. Only remove the entry if
                    // it is still ours; a re-schedule may have replaced it.
                    tracing::info!("pruning reminder for {}: {e}", user.0);
                    let mut jobs = inner.jobs.lock().await;
                    if jobs.get(&user).map(|j| j.id) == Some(job_id) {
                        jobs.remove(&user);
                        drop(jobs);
                        inner.sessions.set_reminder_active(user, false).await;
                    }
                    break;
                }
                tracing::warn!("reminder send to {} failed: {e}", user.0);
            }
          }
        }
    }
}

fn is_unreachable_error(err: &Error) -> bool {
    match err {
        Error::TransportFailure(s) | Error::External(s) => {
            let lower = s.to_lowercase();
            lower.contains("blocked") || lower.contains("chat not found") || lower.contains("deactivated")
        }
        _ => false,
    }
}

/// Next wall-clock occurrence of `at` strictly after `now`, in `now`'s zone.
///
/// DST gaps (the local time does not exist that day) shift one hour later;
/// ambiguous times (the clock repeats) take the earlier instant.
pub fn next_occurrence(now: DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    for _ in 0..3 {
        let naive = date.and_time(at);
        let resolved = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(first, _second) => Some(first),
            LocalResult::None => tz
                .from_local_datetime(&(naive + ChronoDuration::hours(1)))
                .earliest(),
        };

        if let Some(dt) = resolved {
            if dt > now {
                return Some(dt);
            }
        }
        date = date.succ_opt()?;
    }

    None
}
