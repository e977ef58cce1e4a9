//! Serenity-backed implementation of the platform seams.

use crate::core::platform::{ChatPlatform, PresenceUpdater, SentMessage};
use crate::core::state::InboundMessage;
use crate::errors::Result;
use async_trait::async_trait;
use poise::serenity_prelude::{self as serenity, ActivityData, ChannelId, GetMessages, MessageId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Talks to Discord on behalf of the core.
pub struct SerenityPlatform {
    ctx: serenity::Context,
    bot_id: UserId,
}

impl SerenityPlatform {
    /// Wraps the gateway context of the logged-in bot user `bot_id`.
    #[must_use]
    pub const fn new(ctx: serenity::Context, bot_id: UserId) -> Self {
        Self { ctx, bot_id }
    }
}

impl PresenceUpdater for SerenityPlatform {
    fn set_presence(&self, text: &str) {
        self.ctx.set_activity(Some(ActivityData::playing(text)));
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<SentMessage> {
        let sent = ChannelId::new(channel_id).say(&self.ctx, content).await?;
        Ok(SentMessage {
            channel_id,
            message_id: sent.id.get(),
        })
    }

    async fn delete_message(&self, message: SentMessage) -> Result<()> {
        ChannelId::new(message.channel_id)
            .delete_message(&self.ctx.http, MessageId::new(message.message_id))
            .await?;
        Ok(())
    }

    fn delete_message_after(&self, message: SentMessage, delay: Duration) {
        let http = Arc::clone(&self.ctx.http);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let channel = ChannelId::new(message.channel_id);
            if let Err(e) = channel
                .delete_message(http.as_ref(), MessageId::new(message.message_id))
                .await
            {
                warn!("Failed to delete message {}: {e}", message.message_id);
            }
        });
    }

    async fn purge_own_messages(&self, channel_id: u64, scan_limit: u8) -> Result<usize> {
        let channel = ChannelId::new(channel_id);
        let recent = channel
            .messages(&self.ctx, GetMessages::new().limit(scan_limit))
            .await?;
        let own: Vec<MessageId> = recent
            .iter()
            .filter(|message| message.author.id == self.bot_id)
            .map(|message| message.id)
            .collect();
        debug!("Purging {} of {} scanned messages.", own.len(), recent.len());

        // Bulk delete needs at least two ids.
        match own.as_slice() {
            [] => {}
            [single] => channel.delete_message(&self.ctx.http, *single).await?,
            ids => channel.delete_messages(&self.ctx.http, ids).await?,
        }
        Ok(own.len())
    }
}

/// Converts a gateway message into the core's platform-neutral form.
#[must_use]
pub fn inbound_message(message: &serenity::Message) -> InboundMessage {
    InboundMessage {
        message_id: message.id.get(),
        author_id: message.author.id.get(),
        author_name: message.author.name.clone(),
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        channel_id: message.channel_id.get(),
        guild_id: message.guild_id.map(|id| id.get()),
    }
}
