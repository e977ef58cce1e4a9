//! General commands - ping and help.
//! Available both as slash commands and as prefix commands handled by the
//! dispatcher.

use crate::core::action::Action;
use crate::core::dispatch::CommandRegistry;
use crate::core::state::OnMessageState;
use crate::errors::Result;
use async_trait::async_trait;
use std::fmt::Write as _;

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Lists every registered command, including disabled ones.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let text = super::help_text(data.dispatcher.registry(), &data.primary_prefix());
        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

/// Renders the command list shown by `help`.
#[must_use]
pub fn help_text(registry: &CommandRegistry, prefix: &str) -> String {
    let mut text = String::from("**Commands**\n");
    for command in registry.explicit() {
        let _ = write!(text, "• `{prefix}{}` - {}", command.name(), command.description());
        if !command.is_enabled() {
            text.push_str(" *(disabled)*");
        }
        text.push('\n');
    }

    let mut triggers = registry.triggerable().peekable();
    if triggers.peek().is_some() {
        text.push_str("\n**Reactions**\n");
        for command in triggers {
            let _ = write!(text, "• {} - {}", command.name(), command.description());
            if !command.is_enabled() {
                text.push_str(" *(disabled)*");
            }
            text.push('\n');
        }
    }
    text
}

/// Replies "Pong!".
pub struct PingAction;

#[async_trait]
impl Action for PingAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        state.reply("Pong!").await?;
        Ok(true)
    }
}

/// Replies with [`help_text`].
pub struct HelpAction {
    prefix: String,
}

impl HelpAction {
    /// Shows commands with `prefix` in front of their names.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Action for HelpAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        state
            .reply(&help_text(state.registry(), &self.prefix))
            .await?;
        Ok(true)
    }
}
