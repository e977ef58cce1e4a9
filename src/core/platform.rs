//! Seams to the chat platform.
//!
//! The framework never talks to Discord directly; it talks to these traits.
//! `bot::platform` provides the serenity-backed implementation.

use crate::errors::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Address of a posted message, used to delete it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    /// Channel the message lives in
    pub channel_id: u64,
    /// Id of the posted message
    pub message_id: u64,
}

/// Narrow capability for reporting bot status text.
///
/// Components that only need to publish status (such as the weight ledger)
/// receive this instead of the whole platform client.
pub trait PresenceUpdater: Send + Sync {
    /// Replaces the bot's status text.
    fn set_presence(&self, text: &str);
}

/// Outbound operations on the chat platform.
#[async_trait]
pub trait ChatPlatform: PresenceUpdater {
    /// Posts `content` to `channel_id`.
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<SentMessage>;

    /// Deletes a single message.
    async fn delete_message(&self, message: SentMessage) -> Result<()>;

    /// Deletes `message` once `delay` has elapsed. Fire-and-forget; failures
    /// are only logged.
    fn delete_message_after(&self, message: SentMessage, delay: Duration);

    /// Bulk-deletes the bot's own messages among the most recent `scan_limit`
    /// messages in `channel_id`. Returns how many were deleted.
    async fn purge_own_messages(&self, channel_id: u64, scan_limit: u8) -> Result<usize>;
}
