//! Bot layer - Discord-specific wiring.
//!
//! Hosts the serenity client through poise, turns gateway events into calls on
//! the core dispatcher and provides the serenity-backed platform adapter.

/// Command implementations and registry assembly
pub mod commands;
/// Serenity implementation of the platform seams
pub mod platform;

use crate::config::AppConfig;
use crate::core::brad::WeightLedger;
use crate::core::chat;
use crate::core::database::DatabaseCore;
use crate::core::dispatch::Dispatcher;
use crate::core::platform::PresenceUpdater;
use crate::core::prefix::PrefixManager;
use crate::errors::{Error, Result};
use commands::CommandDeps;
use platform::SerenityPlatform;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to every event and slash command.
pub struct BotData {
    /// Immutable application settings
    pub config: Arc<AppConfig>,
    /// Persistence and readiness
    pub database: Arc<DatabaseCore>,
    /// The process-wide weight ledger
    pub ledger: Arc<WeightLedger>,
    /// Routes prefix commands and triggers
    pub dispatcher: Dispatcher,
    /// Outbound Discord operations
    pub platform: Arc<SerenityPlatform>,
}

impl BotData {
    /// Prefix shown to users, the first one configured.
    #[must_use]
    pub fn primary_prefix(&self) -> String {
        self.dispatcher
            .prefixes()
            .prefixes()
            .first()
            .cloned()
            .unwrap_or_default()
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Error while handling {}: {error}", event.snake_case_name());
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Central event handler for Discord events.
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            let inbound = platform::inbound_message(new_message);
            data.dispatcher
                .handle_message(&inbound, &data.database, data.platform.as_ref())
                .await?;
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            if is_new.unwrap_or(false) {
                info!("Joined guild {} ({}).", guild.name, guild.id);
                data.database
                    .ensure_guild_property(&guild.id.to_string())
                    .await?;
            }
        }
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Bot ready event received for: {}", data_about_bot.user.name);
        }
        _ => {}
    }
    Ok(())
}

/// Runs the bootstrap, wires the commands and builds the shared data.
async fn setup(
    ctx: &serenity::Context,
    ready: &serenity::Ready,
    framework: &poise::Framework<BotData, Error>,
    config: Arc<AppConfig>,
    database: Arc<DatabaseCore>,
) -> Result<BotData> {
    info!("Logged in as {}", ready.user.name);
    info!("Registering slash commands globally...");
    poise::builtins::register_globally(ctx, &framework.options().commands).await?;

    let platform = Arc::new(SerenityPlatform::new(ctx.clone(), ready.user.id));
    let presence: Arc<dyn PresenceUpdater> = platform.clone();
    let ledger = Arc::new(WeightLedger::new(database.connection().clone(), presence));

    let guild_ids: Vec<String> = ready.guilds.iter().map(|g| g.id.to_string()).collect();
    match database.generate_models_if_empty(&guild_ids).await {
        Ok(()) => {
            if let Err(e) = ledger.publish_presence().await {
                warn!("Could not publish Brad's weight: {e}");
            }
        }
        // Keep running; the dispatcher ignores messages until a bootstrap succeeds.
        Err(e) => error!("Database bootstrap failed: {e}"),
    }

    let deps = CommandDeps {
        ledger: Arc::clone(&ledger),
        chat: chat::service_from_settings(&config.chat),
        prefix: config.prefixes.first().cloned().unwrap_or_default(),
        bot_name: config.bot_name.clone(),
        starting_dotma_coin: config.users.starting_dotma_coin,
    };
    let registry = commands::build_registry(&deps);
    info!("Registered {} commands.", registry.len());
    let dispatcher = Dispatcher::new(PrefixManager::new(config.prefixes.iter().cloned()), registry);

    Ok(BotData {
        config,
        database,
        ledger,
        dispatcher,
        platform,
    })
}

/// Starts the Discord client and blocks until it stops.
#[instrument(skip(token, config, database))]
pub async fn run_bot(token: String, config: Arc<AppConfig>, database: Arc<DatabaseCore>) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::ping(), commands::help()],
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(setup(ctx, ready, framework, config, database))
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}
