//! Staff commands - toggle, presence and purge.

use crate::core::action::Action;
use crate::core::platform::PresenceUpdater;
use crate::core::state::OnMessageState;
use crate::errors::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Name under which [`ToggleAction`] is registered. It refuses to disable itself.
pub const TOGGLE_COMMAND: &str = "toggle";

/// Smallest and largest purge scan sizes accepted.
const PURGE_RANGE: std::ops::RangeInclusive<u8> = 2..=100;

/// How long the purge confirmation stays visible.
const PURGE_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Enables or disables another command by name.
pub struct ToggleAction;

#[async_trait]
impl Action for ToggleAction {
    async fn execute(&self, state: &OnMessageState<'_>, args: &[String]) -> Result<bool> {
        let Some(name) = args.first() else {
            return Ok(false);
        };
        if name == TOGGLE_COMMAND {
            state.reply("`toggle` cannot be toggled.").await?;
            return Ok(true);
        }
        let Some(command) = state.registry().get(name) else {
            state.reply(&format!("There is no command named `{name}`.")).await?;
            return Ok(true);
        };

        let enabled = !command.is_enabled();
        command.set_enabled(enabled);
        let status = if enabled { "enabled" } else { "disabled" };
        info!("Command `{name}` {status} by {}.", state.message().author_id);
        state.reply(&format!("`{name}` is now {status}.")).await?;
        Ok(true)
    }
}

/// Replaces the bot's status text with the arguments.
pub struct PresenceAction;

#[async_trait]
impl Action for PresenceAction {
    async fn execute(&self, state: &OnMessageState<'_>, args: &[String]) -> Result<bool> {
        let text = args.join(" ");
        if text.is_empty() {
            return Ok(false);
        }
        state.platform().set_presence(&text);
        state.reply(&format!("Presence set to \"{text}\".")).await?;
        Ok(true)
    }
}

/// Bulk-deletes the bot's own messages among the most recent N, then the
/// request itself.
pub struct PurgeAction;

#[async_trait]
impl Action for PurgeAction {
    async fn execute(&self, state: &OnMessageState<'_>, args: &[String]) -> Result<bool> {
        let scan_limit = match args.first().map(|raw| raw.parse::<u8>()) {
            Some(Ok(limit)) if PURGE_RANGE.contains(&limit) => limit,
            _ => {
                state
                    .reply(&format!(
                        "Pick a number of messages between {} and {}.",
                        PURGE_RANGE.start(),
                        PURGE_RANGE.end()
                    ))
                    .await?;
                return Ok(true);
            }
        };

        let channel_id = state.message().channel_id;
        let deleted = state
            .platform()
            .purge_own_messages(channel_id, scan_limit)
            .await?;
        info!("Purged {deleted} message(s) in channel {channel_id}.");
        // Needs Manage Messages; the purge itself still counts without it.
        if let Err(e) = state.platform().delete_message(state.message().address()).await {
            warn!("Could not delete the purge request: {e}");
        }
        let notice = state
            .reply(&format!("Deleted {deleted} of my messages."))
            .await?;
        state.platform().delete_message_after(notice, PURGE_NOTICE_TTL);
        Ok(true)
    }
}
