//! Shared test utilities.
//!
//! In-memory databases, a recording chat platform and small fakes for the
//! action and chat-service seams.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        action::Action,
        chat::ChatService,
        database::DatabaseCore,
        dispatch::CommandRegistry,
        platform::{ChatPlatform, PresenceUpdater, SentMessage},
        state::{InboundMessage, OnMessageState},
    },
    entities::user,
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Author id used when a test does not care who wrote the message.
pub const DEFAULT_AUTHOR: u64 = 42;
/// Channel every test message is posted in.
pub const TEST_CHANNEL: u64 = 1000;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    // Another test may already have installed the subscriber.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A database core over a fresh in-memory database. Not bootstrapped, so
/// it is not ready yet.
pub async fn setup_test_core(developer_ids: &[&str]) -> Result<DatabaseCore> {
    let db = setup_test_db().await?;
    Ok(DatabaseCore::new(
        db,
        developer_ids.iter().map(ToString::to_string).collect(),
        70.0,
    ))
}

/// A plain text message from `author_id` in the test channel.
#[must_use]
pub fn message_from(author_id: u64, content: &str) -> InboundMessage {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    InboundMessage {
        message_id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        author_id,
        author_name: format!("user{author_id}"),
        author_is_bot: false,
        content: content.to_string(),
        channel_id: TEST_CHANNEL,
        guild_id: Some(1),
    }
}

/// Chat platform fake that records every outbound call.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    next_id: AtomicU64,
    fail_sends: bool,
    sent: Mutex<Vec<(SentMessage, String)>>,
    deleted: Mutex<Vec<SentMessage>>,
    scheduled: Mutex<Vec<(SentMessage, Duration)>>,
    purges: Mutex<Vec<(u64, u8)>>,
    presences: Mutex<Vec<String>>,
}

impl RecordingPlatform {
    /// A platform on which every `send_message` fails.
    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// Text of every message sent, oldest first.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Every message sent, with its address.
    pub fn sent(&self) -> Vec<(SentMessage, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages deleted immediately.
    pub fn deleted(&self) -> Vec<SentMessage> {
        self.deleted.lock().unwrap().clone()
    }

    /// Messages scheduled for delayed deletion.
    pub fn scheduled(&self) -> Vec<(SentMessage, Duration)> {
        self.scheduled.lock().unwrap().clone()
    }

    /// Bulk purges as `(channel, scan limit)`.
    pub fn purges(&self) -> Vec<(u64, u8)> {
        self.purges.lock().unwrap().clone()
    }

    /// Every status text published, oldest first.
    pub fn presences(&self) -> Vec<String> {
        self.presences.lock().unwrap().clone()
    }
}

impl PresenceUpdater for RecordingPlatform {
    fn set_presence(&self, text: &str) {
        self.presences.lock().unwrap().push(text.to_string());
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<SentMessage> {
        if self.fail_sends {
            return Err(Error::ExternalService {
                message: "send failed".to_string(),
            });
        }
        let message = SentMessage {
            channel_id,
            message_id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        };
        self.sent
            .lock()
            .unwrap()
            .push((message, content.to_string()));
        Ok(message)
    }

    async fn delete_message(&self, message: SentMessage) -> Result<()> {
        self.deleted.lock().unwrap().push(message);
        Ok(())
    }

    fn delete_message_after(&self, message: SentMessage, delay: Duration) {
        self.scheduled.lock().unwrap().push((message, delay));
    }

    async fn purge_own_messages(&self, channel_id: u64, scan_limit: u8) -> Result<usize> {
        self.purges.lock().unwrap().push((channel_id, scan_limit));
        let own = self
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(message, _)| message.channel_id == channel_id)
            .count();
        Ok(own.min(usize::from(scan_limit)))
    }
}

/// Action fake that counts its calls and returns a fixed outcome.
pub struct CountingAction {
    calls: Arc<AtomicUsize>,
    outcome: bool,
}

impl CountingAction {
    /// Counts calls into `calls` and reports success.
    pub const fn succeeding(calls: Arc<AtomicUsize>) -> Self {
        Self {
            calls,
            outcome: true,
        }
    }

    /// Counts calls into `calls` and reports failure.
    pub const fn failing(calls: Arc<AtomicUsize>) -> Self {
        Self {
            calls,
            outcome: false,
        }
    }
}

#[async_trait]
impl Action for CountingAction {
    async fn execute(&self, _state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome)
    }
}

/// Chat service fake answering every prompt with the same text.
pub struct FixedChatService(pub String);

#[async_trait]
impl ChatService for FixedChatService {
    async fn respond(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Chat service fake that is always down.
pub struct FailingChatService;

#[async_trait]
impl ChatService for FailingChatService {
    async fn respond(&self, _prompt: &str) -> Result<String> {
        Err(Error::ExternalService {
            message: "service unavailable".to_string(),
        })
    }
}

/// Everything needed to build an [`OnMessageState`] in a test.
pub struct TestHarness {
    /// Bootstrapped, ready database core
    pub database: DatabaseCore,
    /// Recording platform shared with anything that needs an `Arc`
    pub platform: Arc<RecordingPlatform>,
    /// Registry exposed through the state
    pub registry: CommandRegistry,
}

impl TestHarness {
    /// A ready harness with an empty registry.
    pub async fn new(developer_ids: &[&str]) -> Result<Self> {
        Self::with_registry(developer_ids, CommandRegistry::new()).await
    }

    /// A ready harness exposing `registry`.
    pub async fn with_registry(developer_ids: &[&str], registry: CommandRegistry) -> Result<Self> {
        let database = setup_test_core(developer_ids).await?;
        database.generate_models_if_empty(&[]).await?;
        Ok(Self {
            database,
            platform: Arc::new(RecordingPlatform::default()),
            registry,
        })
    }

    /// The database connection.
    pub const fn db(&self) -> &DatabaseConnection {
        self.database.connection()
    }

    /// State for a message with `content`. The author id is taken from
    /// `user` when given, otherwise [`DEFAULT_AUTHOR`] is used.
    pub fn state(&self, content: &str, user: Option<user::Model>) -> OnMessageState<'_> {
        let author_id = user
            .as_ref()
            .and_then(|u| u.id.parse().ok())
            .unwrap_or(DEFAULT_AUTHOR);
        // Leaked so the state can borrow it for the rest of the test.
        let message: &'static InboundMessage = Box::leak(Box::new(message_from(author_id, content)));
        OnMessageState::new(
            message,
            user,
            &self.database,
            self.platform.as_ref(),
            &self.registry,
        )
    }
}

/// Registers `id` as a user at `level` and returns the stored record.
pub async fn create_test_user(
    db: &DatabaseConnection,
    id: &str,
    level: crate::core::access_level::AccessLevel,
    dotma_coin: i64,
) -> Result<user::Model> {
    crate::core::user::create_user(db, id, level, dotma_coin).await
}
