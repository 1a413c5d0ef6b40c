//! Guide delivery with at-most-once semantics.
//!
//! Two near-simultaneous taps must not both pass the entitlement check and
//! both send a PDF. The grant flag is reserved (compare-and-set under the
//! user's session lock) *before* the transport send and rolled back only if
//! the send itself fails, so a failed send stays retryable and a successful
//! send can never repeat.

use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::{
    callback::{CallbackEvent, NavTarget},
    catalog::ContentCatalog,
    domain::{ChatId, UserId},
    entitlement::{Entitlement, EntitlementGate},
    errors::Error,
    eventlog::EventLogger,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    session::SessionStore,
    Result,
};

const DELIVERY_CAPTION: &str = "Держи! Пусть зайдёт в работу сегодня.";

pub struct ContentDistributor {
    catalog: Arc<ContentCatalog>,
    sessions: Arc<SessionStore>,
    gate: Arc<EntitlementGate>,
    messenger: Arc<dyn MessagingPort>,
    events: Arc<EventLogger>,
    send_timeout: Duration,
}

impl ContentDistributor {
    pub fn new(
        catalog: Arc<ContentCatalog>,
        sessions: Arc<SessionStore>,
        gate: Arc<EntitlementGate>,
        messenger: Arc<dyn MessagingPort>,
        events: Arc<EventLogger>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            sessions,
            gate,
            messenger,
            events,
            send_timeout,
        }
    }

    /// Deliver one guide to one user, at most once ever.
    pub async fn deliver(&self, user: UserId, chat: ChatId, key: &str) -> Result<()> {
        let entry = self
            .catalog
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?
            .clone();

        match self.gate.check(user, key).await? {
            Entitlement::Granted => {}
            Entitlement::AlreadyReceived => return Err(Error::AlreadyDelivered),
            Entitlement::Denied(reason) => return Err(Error::Denied(reason)),
        }

        // Close the check-then-act window: exactly one concurrent caller
        // wins the reservation; the rest observe "already delivered".
        if !self.sessions.try_reserve_grant(user).await {
            return Err(Error::AlreadyDelivered);
        }

        let keyboard = InlineKeyboard::new(vec![vec![InlineButton::callback(
            "← Назад",
            CallbackEvent::Nav(NavTarget::Menu).encode(),
        )]]);

        let sent = timeout(
            self.send_timeout,
            self.messenger
                .send_document(chat, &entry.file, DELIVERY_CAPTION, Some(keyboard)),
        )
        .await;

        match sent {
            Ok(Ok(_)) => {
                self.sessions.commit_grant(user).await;
                self.events.log(user, "download_guide", key);
                Ok(())
            }
            Ok(Err(e)) => {
                self.sessions.rollback_grant(user).await;
                Err(Error::TransportFailure(format!("{e}")))
            }
            Err(_) => {
                self.sessions.rollback_grant(user).await;
                Err(Error::TransportFailure("send timed out".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::{
        domain::{MessageId, MessageRef},
        entitlement::tests::FakeMembership,
        entitlement::DenyReason,
        messaging::types::MessagingCapabilities,
        ports::Membership,
    };

    #[derive(Default)]
    struct FakeMessenger {
        documents: AtomicUsize,
        fail_next: AtomicBool,
    }

    impl FakeMessenger {
        fn document_sends(&self) -> usize {
            self.documents.load(Ordering::SeqCst)
        }
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
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
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
            // Widen the race window so concurrent callers overlap.
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(Error::TransportFailure("file missing".to_string()));
            }
            self.documents.fetch_add(1, Ordering::SeqCst);
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
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
                message_id: MessageId(1),
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

    struct Fixture {
        distributor: Arc<ContentDistributor>,
        messenger: Arc<FakeMessenger>,
        membership: Arc<FakeMembership>,
        sessions: Arc<SessionStore>,
        events_path: PathBuf,
    }

    fn fixture(membership: FakeMembership) -> Fixture {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let events_path = PathBuf::from(format!(
            "/tmp/mindmeld-dist-test-{}-{ts}.csv",
            std::process::id()
        ));

        let catalog = Arc::new(ContentCatalog::builtin(Path::new("assets")).unwrap());
        let sessions = Arc::new(SessionStore::new(None));
        let membership = Arc::new(membership);
        let messenger = Arc::new(FakeMessenger::default());
        let gate = Arc::new(EntitlementGate::new(
            catalog.clone(),
            sessions.clone(),
            membership.clone(),
            "@channel",
            Duration::from_millis(200),
        ));
        let distributor = Arc::new(ContentDistributor::new(
            catalog,
            sessions.clone(),
            gate,
            messenger.clone(),
            Arc::new(EventLogger::new(events_path.clone())),
            Duration::from_secs(1),
        ));

        Fixture {
            distributor,
            messenger,
            membership,
            sessions,
            events_path,
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.events_path);
        }
    }

    #[tokio::test]
    async fn second_request_is_already_delivered_with_one_send() {
        let fx = fixture(FakeMembership::member());
        let user = UserId(1);
        let chat = ChatId(1);

        fx.distributor
            .deliver(user, chat, "path_to_self")
            .await
            .unwrap();
        let err = fx
            .distributor
            .deliver(user, chat, "path_to_self")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AlreadyDelivered));
        assert_eq!(fx.messenger.document_sends(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_send_at_most_once() {
        let fx = fixture(FakeMembership::member());
        let user = UserId(2);
        let chat = ChatId(2);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let distributor = fx.distributor.clone();
            handles.push(tokio::spawn(async move {
                distributor.deliver(user, chat, "know_but_dont_do").await
            }));
        }

        let mut oks = 0usize;
        let mut already = 0usize;
        for h in handles {
            match h.await.unwrap() {
                Ok(()) => oks += 1,
                Err(Error::AlreadyDelivered) => already += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(oks, 1);
        assert_eq!(already, 7);
        assert_eq!(fx.messenger.document_sends(), 1);
    }

    #[tokio::test]
    async fn transport_failure_leaves_the_grant_retryable() {
        let fx = fixture(FakeMembership::member());
        let user = UserId(3);
        let chat = ChatId(3);

        fx.messenger.fail_next.store(true, Ordering::SeqCst);
        let err = fx
            .distributor
            .deliver(user, chat, "self_acceptance")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransportFailure(_)));
        assert!(!fx.sessions.is_granted(user).await);

        // Retry succeeds and commits.
        fx.distributor
            .deliver(user, chat, "self_acceptance")
            .await
            .unwrap();
        assert!(fx.sessions.is_granted(user).await);
        assert_eq!(fx.messenger.document_sends(), 1);
    }

    #[tokio::test]
    async fn unknown_key_never_touches_the_transport() {
        let fx = fixture(FakeMembership::member());
        let err = fx
            .distributor
            .deliver(UserId(4), ChatId(4), "no_such_guide")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(fx.messenger.document_sends(), 0);
    }

    #[tokio::test]
    async fn subscribe_then_any_later_key_is_blocked_across_keys() {
        let fx = fixture(FakeMembership::not_member());
        let user = UserId(5);
        let chat = ChatId(5);

        let err = fx
            .distributor
            .deliver(user, chat, "path_to_self")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Denied(DenyReason::NotSubscribed)));
        assert_eq!(fx.messenger.document_sends(), 0);

        // The user subscribes; a different guide is granted once.
        fx.membership.set(Ok(Membership::Member));
        fx.distributor
            .deliver(user, chat, "know_but_dont_do")
            .await
            .unwrap();

        // Any further key is refused: one guide per user, ever.
        let err = fx
            .distributor
            .deliver(user, chat, "self_acceptance")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyDelivered));
        assert_eq!(fx.messenger.document_sends(), 1);
    }

    #[tokio::test]
    async fn lookup_failure_denies_and_sends_nothing() {
        let fx = fixture(FakeMembership::failing());
        let err = fx
            .distributor
            .deliver(UserId(6), ChatId(6), "path_to_self")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Denied(DenyReason::LookupFailed)));
        assert_eq!(fx.messenger.document_sends(), 0);
    }
}
