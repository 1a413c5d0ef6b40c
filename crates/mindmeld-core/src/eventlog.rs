//! Fire-and-forget event log.
//!
//! One CSV line per user action (`timestamp,user_id,event,details`). The log
//! is observability plus the recipient source for broadcasts; a write
//! failure must never affect the flow that produced the event.

use std::{
    collections::HashSet,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;

use crate::{
    domain::{ChatId, UserId},
    messaging::port::MessagingPort,
    Result,
};

const HEADER: &str = "timestamp,user_id,event,details";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventStats {
    pub users: usize,
    pub events: usize,
}

#[derive(Clone, Debug)]
pub struct EventLogger {
    path: PathBuf,
}

impl EventLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event. Failures are logged and swallowed.
    pub fn log(&self, user: UserId, kind: &str, details: &str) {
        if let Err(e) = self.append(user, kind, details) {
            tracing::warn!("event log write failed: {e}");
        }
    }

    fn append(&self, user: UserId, kind: &str, details: &str) -> Result<()> {
        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if is_new {
            writeln!(file, "{HEADER}")?;
        }
        writeln!(
            file,
            "{},{},{},{}",
            Utc::now().to_rfc3339(),
            user.0,
            csv_field(kind),
            csv_field(details)
        )?;
        Ok(())
    }

    /// Every user id ever seen in the log. The id column is never quoted,
    /// so a plain comma split is enough.
    pub fn known_users(&self) -> HashSet<i64> {
        let Ok(txt) = std::fs::read_to_string(&self.path) else {
            return HashSet::new();
        };

        txt.lines()
            .skip(1)
            .filter_map(|line| line.split(',').nth(1))
            .filter_map(|id| id.trim().parse::<i64>().ok())
            .collect()
    }

    pub fn stats(&self) -> EventStats {
        let users = self.known_users().len();
        let events = std::fs::read_to_string(&self.path)
            .map(|txt| txt.lines().skip(1).filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0);
        EventStats { users, events }
    }

    /// Send `text` to every known user. One blocked or broken recipient
    /// never aborts the rest; returns how many sends succeeded.
    pub async fn broadcast(&self, messenger: &dyn MessagingPort, text: &str) -> usize {
        let mut users: Vec<i64> = self.known_users().into_iter().collect();
        users.sort_unstable();

        let mut sent = 0usize;
        for uid in users {
            match messenger.send_html(ChatId(uid), text, None).await {
                Ok(_) => sent += 1,
                Err(e) => tracing::warn!("broadcast to {uid} failed: {e}"),
            }
        }
        sent
    }
}

/// Minimal CSV quoting: wrap when the field contains a delimiter, quote or
/// newline; double any embedded quotes.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::{
        domain::MessageRef,
        errors::Error,
        messaging::types::{InlineKeyboard, MessagingCapabilities},
    };

    fn tmp_log() -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        PathBuf::from(format!("/tmp/mindmeld-events-test-{}-{ts}.csv", std::process::id()))
    }

    #[derive(Default)]
    struct FakeMessenger {
        sends: AtomicUsize,
        fail_chat: Option<i64>,
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_html: true,
                supports_edit: true,
                supports_documents: true,
                supports_photos: true,
                max_message_len: 4096,
            }
        }

        async fn send_html(
            &self,
            chat_id: ChatId,
            _html: &str,
            _keyboard: Option<InlineKeyboard>,
        ) -> Result<MessageRef> {
            if self.fail_chat == Some(chat_id.0) {
                return Err(Error::TransportFailure("bot was blocked".to_string()));
            }
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(MessageRef {
                chat_id,
                message_id: crate::domain::MessageId(1),
            })
        }

        async fn edit_html(
            &self,
            _msg: MessageRef,
            _html: &str,
            _keyboard: Option<InlineKeyboard>,
        ) -> Result<()> {
            Ok(())
        }

        async fn delete_message(&self, _msg: MessageRef) -> Result<()> {
            Ok(())
        }

        async fn send_document(
            &self,
            chat_id: ChatId,
            _file: &Path,
            _caption: &str,
            _keyboard: Option<InlineKeyboard>,
        ) -> Result<MessageRef> {
            Ok(MessageRef {
                chat_id,
                message_id: crate::domain::MessageId(1),
            })
        }

        async fn send_photo(
            &self,
            chat_id: ChatId,
            _file: &Path,
            _caption_html: &str,
            _keyboard: Option<InlineKeyboard>,
        ) -> Result<MessageRef> {
            Ok(MessageRef {
                chat_id,
                message_id: crate::domain::MessageId(1),
            })
        }

        async fn answer_callback_query(
            &self,
            _callback_id: &str,
            _text: Option<&str>,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_appends_header_then_rows() {
        let log = EventLogger::new(tmp_log());
        log.log(UserId(10), "open_guides", "");
        log.log(UserId(11), "download_guide", "path_to_self");
        log.log(UserId(10), "qod_pick", "вариант, с запятой");

        let txt = std::fs::read_to_string(log.path()).unwrap();
        let mut lines = txt.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(txt.lines().count(), 4);
        assert!(txt.contains("\"вариант, с запятой\""));

        assert_eq!(log.stats(), EventStats { users: 2, events: 3 });
        assert_eq!(log.known_users(), HashSet::from([10, 11]));

        let _ = std::fs::remove_file(log.path());
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let log = EventLogger::new("/tmp/mindmeld-no-such-events.csv");
        assert_eq!(log.stats(), EventStats::default());
        assert!(log.known_users().is_empty());
    }

    #[tokio::test]
    async fn broadcast_skips_broken_recipients() {
        let log = EventLogger::new(tmp_log());
        log.log(UserId(1), "start", "");
        log.log(UserId(2), "start", "");
        log.log(UserId(3), "start", "");

        let messenger = FakeMessenger {
            fail_chat: Some(2),
            ..FakeMessenger::default()
        };
        let sent = log.broadcast(&messenger, "Вопрос дня ✨").await;
        assert_eq!(sent, 2);
        assert_eq!(messenger.sends.load(Ordering::SeqCst), 2);

        let _ = std::fs::remove_file(log.path());
    }
}
