//! Account commands - register, profile and kiss.

use crate::core::access_level::AccessLevel;
use crate::core::action::Action;
use crate::core::state::OnMessageState;
use crate::core::user;
use crate::errors::Result;
use async_trait::async_trait;
use tracing::info;

/// Creates a user record for the author.
pub struct RegisterAction {
    starting_dotma_coin: i64,
}

impl RegisterAction {
    /// New accounts start with `starting_dotma_coin` DotmaCoins.
    #[must_use]
    pub const fn new(starting_dotma_coin: i64) -> Self {
        Self {
            starting_dotma_coin,
        }
    }
}

#[async_trait]
impl Action for RegisterAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        let message = state.message();
        if state.user().is_some() {
            state.reply("You are already registered.").await?;
            return Ok(true);
        }

        user::create_user(
            state.db(),
            &message.author_id.to_string(),
            AccessLevel::Registered,
            self.starting_dotma_coin,
        )
        .await?;
        info!("Registered user {}.", message.author_id);
        state
            .reply(&format!(
                "Welcome {}! You have been registered and received {} DotmaCoins.",
                message.author_name, self.starting_dotma_coin
            ))
            .await?;
        Ok(true)
    }
}

/// Shows the author's profile.
pub struct ProfileAction;

#[async_trait]
impl Action for ProfileAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        let name = &state.message().author_name;
        let Some(profile) = state.user() else {
            state
                .reply(&format!(
                    "```{name} - The unregistered.\nYou are not registered. Use the register command to join.```"
                ))
                .await?;
            return Ok(true);
        };

        let hours = (chrono::Utc::now() - profile.date_registered).num_hours();
        state
            .reply(&format!(
                "```{name} - {title}\n\
                 Access Level: {level_num} ({level})\n\
                 Level {lvl} ({xp} xp)\n\
                 Wallet:\n   DotmaCoins: {dotma}\n   BradCoins: {brad}\n\n\
                 You have been registered for {hours} hour(s).```",
                title = profile.title,
                level_num = profile.access_level as i32,
                level = profile.access_level,
                lvl = profile.level,
                xp = profile.experience,
                dotma = profile.dotma_coin,
                brad = profile.brad_coin,
            ))
            .await?;
        Ok(true)
    }
}

/// Sends a kiss to the first argument.
pub struct KissAction;

#[async_trait]
impl Action for KissAction {
    async fn execute(&self, state: &OnMessageState<'_>, args: &[String]) -> Result<bool> {
        let Some(target) = args.first() else {
            return Ok(false);
        };
        state
            .reply(&format!(
                "{target} ( ˘ ³˘)♥ from <@{}>",
                state.message().author_id
            ))
            .await?;
        Ok(true)
    }
}
