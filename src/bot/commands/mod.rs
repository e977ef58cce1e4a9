//! Concrete commands and the registry they are assembled into.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Register, profile and kiss
pub mod account;

/// Toggle, presence and purge
pub mod admin;

/// Feed, brad and resetrun
pub mod brad;

/// Ping and help
pub mod general;

/// Fortnite, pubg and chat reactions
pub mod triggers;

pub use general::{help, ping};

use crate::core::access_level::AccessLevel;
use crate::core::brad::WeightLedger;
use crate::core::chat::ChatService;
use crate::core::command::Command;
use crate::core::dispatch::CommandRegistry;
use std::sync::Arc;

/// Shared services and settings the concrete commands are built from.
pub struct CommandDeps {
    /// The process-wide weight ledger
    pub ledger: Arc<WeightLedger>,
    /// Conversational backend for the chat trigger
    pub chat: Arc<dyn ChatService>,
    /// Prefix shown in help and usage strings
    pub prefix: String,
    /// Name the chat trigger listens for
    pub bot_name: String,
    /// DotmaCoins granted on registration
    pub starting_dotma_coin: i64,
}

/// Builds the registry with every command enabled.
#[must_use]
pub fn build_registry(deps: &CommandDeps) -> CommandRegistry {
    let p = &deps.prefix;
    let commands = [
        Command::new("ping", AccessLevel::Unregistered, 0, "Check that the bot is alive.")
            .with_action(general::PingAction),
        Command::new("help", AccessLevel::Unregistered, 0, "List all commands.")
            .with_action(general::HelpAction::new(p.clone())),
        Command::new("register", AccessLevel::Unregistered, 0, "Create your profile.")
            .with_action(account::RegisterAction::new(deps.starting_dotma_coin)),
        Command::new("profile", AccessLevel::Unregistered, 0, "View your profile.")
            .with_action(account::ProfileAction),
        Command::new("kiss", AccessLevel::Registered, 1, "Attempt to kiss someone.")
            .with_usage(format!("{p}kiss [target]"))
            .with_action(account::KissAction),
        Command::new("feed", AccessLevel::Registered, 1, "Feed Brad some DotmaCoins.")
            .with_usage(format!("{p}feed [coins]"))
            .with_action(brad::FeedAction::new(Arc::clone(&deps.ledger))),
        Command::new("brad", AccessLevel::Unregistered, 0, "See how Brad is doing.")
            .with_action(brad::BradAction::new(Arc::clone(&deps.ledger))),
        Command::new("resetrun", AccessLevel::Developer, 0, "Start a new feeding run.")
            .with_action(brad::ResetRunAction::new(Arc::clone(&deps.ledger))),
        Command::new(admin::TOGGLE_COMMAND, AccessLevel::Developer, 1, "Enable or disable a command.")
            .with_usage(format!("{p}toggle [command]"))
            .with_action(admin::ToggleAction),
        Command::new("presence", AccessLevel::Developer, 1, "Set the bot's status text.")
            .with_usage(format!("{p}presence [text]"))
            .with_action(admin::PresenceAction),
        Command::new("purge", AccessLevel::Moderator, 1, "Delete my recent messages.")
            .with_usage(format!("{p}purge [2-100]"))
            .with_action(admin::PurgeAction),
        Command::triggered(
            "fortnite",
            AccessLevel::Unregistered,
            "Reacts when someone mentions fortnite.",
            triggers::FortniteTrigger,
        )
        .with_action(triggers::FortniteAction),
        Command::triggered(
            "pubg",
            AccessLevel::Unregistered,
            "Reacts when someone mentions pubg.",
            triggers::PubgTrigger,
        )
        .with_action(triggers::PubgAction),
        Command::triggered(
            "chat",
            AccessLevel::Unregistered,
            "Talks back when addressed by name.",
            triggers::ChatTrigger::new(deps.bot_name.clone()),
        )
        .with_action(triggers::ChatAction::new(
            deps.bot_name.clone(),
            Arc::clone(&deps.chat),
        )),
    ];

    let mut registry = CommandRegistry::new();
    for command in commands {
        registry.register(command);
    }
    registry
}
