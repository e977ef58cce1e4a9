//! Per-message context.

use crate::core::database::DatabaseCore;
use crate::core::dispatch::CommandRegistry;
use crate::core::platform::{ChatPlatform, SentMessage};
use crate::entities::user;
use crate::errors::Result;
use sea_orm::DatabaseConnection;

/// Platform-neutral view of an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Id of the message itself
    pub message_id: u64,
    /// Author's platform user id
    pub author_id: u64,
    /// Author's display name
    pub author_name: String,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Raw message text
    pub content: String,
    /// Channel the message was posted in
    pub channel_id: u64,
    /// Guild the channel belongs to, if any
    pub guild_id: Option<u64>,
}

impl InboundMessage {
    /// Where this message lives, for deleting it.
    #[must_use]
    pub const fn address(&self) -> SentMessage {
        SentMessage {
            channel_id: self.channel_id,
            message_id: self.message_id,
        }
    }
}

/// Everything a command or trigger needs while one message is processed.
///
/// Built once per inbound message by the dispatch loop and dropped when
/// dispatch finishes. It borrows the message and the shared services; only the
/// resolved user record is owned.
pub struct OnMessageState<'a> {
    message: &'a InboundMessage,
    user: Option<user::Model>,
    database: &'a DatabaseCore,
    platform: &'a dyn ChatPlatform,
    registry: &'a CommandRegistry,
}

impl<'a> OnMessageState<'a> {
    /// Bundles an inbound message with its resolved user and the shared handles.
    #[must_use]
    pub fn new(
        message: &'a InboundMessage,
        user: Option<user::Model>,
        database: &'a DatabaseCore,
        platform: &'a dyn ChatPlatform,
        registry: &'a CommandRegistry,
    ) -> Self {
        Self {
            message,
            user,
            database,
            platform,
            registry,
        }
    }

    /// The message being processed.
    #[must_use]
    pub const fn message(&self) -> &'a InboundMessage {
        self.message
    }

    /// The author's user record, if they are registered.
    #[must_use]
    pub const fn user(&self) -> Option<&user::Model> {
        self.user.as_ref()
    }

    /// Persistence handle.
    #[must_use]
    pub const fn database(&self) -> &'a DatabaseCore {
        self.database
    }

    /// Shortcut for the underlying connection.
    #[must_use]
    pub const fn db(&self) -> &'a DatabaseConnection {
        self.database.connection()
    }

    /// Outbound chat operations.
    #[must_use]
    pub fn platform(&self) -> &'a dyn ChatPlatform {
        self.platform
    }

    /// Every registered command, for introspection.
    #[must_use]
    pub const fn registry(&self) -> &'a CommandRegistry {
        self.registry
    }

    /// Sends `content` to the channel the message came from.
    pub async fn reply(&self, content: &str) -> Result<SentMessage> {
        self.platform
            .send_message(self.message.channel_id, content)
            .await
    }
}
