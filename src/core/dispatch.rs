//! Command registry and the per-message dispatch loop.

use crate::core::access_level::AccessLevel;
use crate::core::command::Command;
use crate::core::database::DatabaseCore;
use crate::core::platform::ChatPlatform;
use crate::core::prefix::PrefixManager;
use crate::core::state::{InboundMessage, OnMessageState};
use crate::core::user;
use crate::entities::user as user_entity;
use crate::errors::{Error, Result};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Every registered command, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<Command>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Adds a command. Returns false if one with the same name is already
    /// registered; the existing command is kept.
    pub fn register(&mut self, command: Command) -> bool {
        if self.get(command.name()).is_some() {
            warn!("Command `{}` is already registered.", command.name());
            return false;
        }
        self.commands.push(Arc::new(command));
        true
    }

    /// Looks a command up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Command>> {
        self.commands.iter().find(|command| command.name() == name)
    }

    /// All commands, enabled or not.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter()
    }

    /// Commands invoked by prefix and name.
    pub fn explicit(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter().filter(|command| command.is_explicit())
    }

    /// Commands carrying a trigger.
    pub fn triggerable(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter().filter(|command| !command.is_explicit())
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A parsed explicit invocation: the command name and the tokens after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name typed after the prefix
    pub name: String,
    /// Whitespace-separated tokens following the name
    pub args: Vec<String>,
}

/// What happened to one message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// The message was dropped before any command was considered
    pub ignored: bool,
    /// Explicit command that ran, if any
    pub explicit: Option<String>,
    /// Triggers that fired and completed
    pub triggered: Vec<String>,
}

impl DispatchReport {
    fn ignored() -> Self {
        Self {
            ignored: true,
            ..Self::default()
        }
    }
}

/// Routes inbound messages to commands.
#[derive(Debug)]
pub struct Dispatcher {
    prefixes: PrefixManager,
    registry: CommandRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over a fixed prefix set and registry.
    #[must_use]
    pub const fn new(prefixes: PrefixManager, registry: CommandRegistry) -> Self {
        Self { prefixes, registry }
    }

    /// The registered prefixes.
    #[must_use]
    pub const fn prefixes(&self) -> &PrefixManager {
        &self.prefixes
    }

    /// The registered commands.
    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Splits `content` into an invocation if it starts with a known prefix.
    #[must_use]
    pub fn parse(&self, content: &str) -> Option<Invocation> {
        let prefix = self.prefixes.match_prefix(content)?;
        let mut tokens = content[prefix.len()..].split_whitespace();
        let name = tokens.next()?.to_string();
        Some(Invocation {
            name,
            args: tokens.map(ToString::to_string).collect(),
        })
    }

    /// Processes one inbound message end to end.
    ///
    /// Bot authors are ignored, as is everything that arrives before the
    /// database is ready. Errors from the explicit command are replied to in
    /// the channel; trigger errors are only logged. The returned error is
    /// reserved for failures outside any command, such as resolving the
    /// author's record.
    #[instrument(skip_all, fields(message = message.message_id, author = message.author_id))]
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
        database: &DatabaseCore,
        platform: &dyn ChatPlatform,
    ) -> Result<DispatchReport> {
        if message.author_is_bot {
            return Ok(DispatchReport::ignored());
        }
        if !database.is_ready() {
            debug!("Database not ready, ignoring message.");
            return Ok(DispatchReport::ignored());
        }

        let author = user::find_user(database.connection(), &message.author_id.to_string()).await?;
        let state = OnMessageState::new(message, author, database, platform, &self.registry);
        let mut report = DispatchReport::default();

        if let Some(invocation) = self.parse(&message.content) {
            report.explicit = self.dispatch_explicit(&state, &invocation).await?;
        }
        report.triggered = self.run_triggers(&state).await;
        Ok(report)
    }

    async fn dispatch_explicit(
        &self,
        state: &OnMessageState<'_>,
        invocation: &Invocation,
    ) -> Result<Option<String>> {
        let Some(command) = self.registry.get(&invocation.name) else {
            debug!("Unknown command `{}`.", invocation.name);
            return Ok(None);
        };
        match self.run_explicit(state, invocation).await {
            Ok(ran) => Ok(ran.then(|| command.name().to_string())),
            Err(e) => {
                warn!("Command `{}` failed: {e}", command.name());
                if let Err(reply_error) = state.reply(&error_reply(command, &e)).await {
                    error!("Could not report failure of `{}`: {reply_error}", command.name());
                }
                Ok(Some(command.name().to_string()))
            }
        }
    }

    /// Runs the explicit command named by `invocation`.
    ///
    /// Returns `Ok(false)` when no enabled explicit command has that name.
    pub async fn run_explicit(
        &self,
        state: &OnMessageState<'_>,
        invocation: &Invocation,
    ) -> Result<bool> {
        let Some(command) = self
            .registry
            .get(&invocation.name)
            .filter(|command| command.is_explicit())
        else {
            return Ok(false);
        };
        if !command.is_enabled() {
            debug!("Command `{}` is disabled.", command.name());
            return Ok(false);
        }
        if invocation.args.len() < command.arg_length() {
            return Err(Error::InvalidArguments {
                command: command.name().to_string(),
                expected: command.arg_length(),
                got: invocation.args.len(),
            });
        }

        match state.user() {
            Some(author) => command.execute_action(state, author, &invocation.args).await?,
            None if command.access_level() == AccessLevel::LOWEST => {
                command
                    .execute_action_no_user(state, &invocation.args)
                    .await?;
            }
            None => {
                return Err(Error::Unauthorized {
                    command: command.name().to_string(),
                    required: command.access_level(),
                    actual: AccessLevel::LOWEST,
                });
            }
        }
        Ok(true)
    }

    /// Evaluates every enabled trigger. Each one is independent: a failure is
    /// logged and the rest still run. Returns the names of the triggers whose
    /// action ran to completion; actions above the author's level are skipped
    /// and not reported.
    pub async fn run_triggers(&self, state: &OnMessageState<'_>) -> Vec<String> {
        let placeholder;
        let author = match state.user() {
            Some(author) => author,
            None => {
                placeholder = user_entity::Model::placeholder(state.message().author_id.to_string());
                &placeholder
            }
        };

        let mut fired = Vec::new();
        for command in self.registry.triggerable().filter(|c| c.is_enabled()) {
            let outcome = match command.try_trigger(state).await {
                Ok(true) => command.execute_action_no_warning(state, author, &[]).await,
                other => other,
            };
            match outcome {
                Ok(true) => fired.push(command.name().to_string()),
                Ok(false) => {}
                Err(e) => error!("Trigger `{}` failed: {e}", command.name()),
            }
        }
        fired
    }
}

/// User-facing text for an explicit command failure.
fn error_reply(command: &Command, error: &Error) -> String {
    match error {
        Error::Unauthorized { required, .. } => {
            format!("You need to be at least {required} to use `{}`.", command.name())
        }
        Error::InvalidArguments { expected, got, .. } => {
            let usage = command.usage().unwrap_or(command.name());
            format!(
                "`{}` needs {expected} argument(s) but got {got}. Usage: `{usage}`",
                command.name()
            )
        }
        _ => format!("Something went wrong while running `{}`.", command.name()),
    }
}
