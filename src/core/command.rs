//! Commands and the authorization gate.
//!
//! A [`Command`] is one value regardless of how it is invoked: explicit
//! commands are matched against `prefix + name`, triggerable commands carry a
//! [`Trigger`] that the dispatcher evaluates on every message. Both own exactly
//! one [`Action`], guarded by a minimum [`AccessLevel`].

use crate::core::access_level::AccessLevel;
use crate::core::action::{Action, NoopAction, Trigger};
use crate::core::state::OnMessageState;
use crate::entities::user;
use crate::errors::{Error, Result};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};

/// How a command gets selected for execution.
#[derive(Clone)]
pub enum CommandKind {
    /// Invoked by typing a prefix followed by the command name
    Explicit,
    /// Evaluated on every message through its trigger
    Triggered(Arc<dyn Trigger>),
}

impl fmt::Debug for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("Explicit"),
            Self::Triggered(_) => f.write_str("Triggered"),
        }
    }
}

/// A registered behavior with its access gate.
pub struct Command {
    name: String,
    access_level: AccessLevel,
    arg_length: usize,
    description: String,
    usage: Option<String>,
    enabled: AtomicBool,
    action: Arc<dyn Action>,
    kind: CommandKind,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("access_level", &self.access_level)
            .field("arg_length", &self.arg_length)
            .field("enabled", &self.is_enabled())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Creates an enabled explicit command whose action does nothing until
    /// [`Command::with_action`] installs one.
    pub fn new(
        name: impl Into<String>,
        access_level: AccessLevel,
        arg_length: usize,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            access_level,
            arg_length,
            description: description.into(),
            usage: None,
            enabled: AtomicBool::new(true),
            action: Arc::new(NoopAction),
            kind: CommandKind::Explicit,
        }
    }

    /// Creates an enabled triggerable command. Triggered commands take no
    /// arguments.
    pub fn triggered(
        name: impl Into<String>,
        access_level: AccessLevel,
        description: impl Into<String>,
        trigger: impl Trigger + 'static,
    ) -> Self {
        Self {
            kind: CommandKind::Triggered(Arc::new(trigger)),
            ..Self::new(name, access_level, 0, description)
        }
    }

    /// Replaces the command's action.
    #[must_use]
    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.action = Arc::new(action);
        self
    }

    /// Sets the usage line shown when too few arguments are given.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Invocation string, also the command's identity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum access level required to run the action.
    #[must_use]
    pub const fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    /// Number of arguments the command expects.
    #[must_use]
    pub const fn arg_length(&self) -> usize {
        self.arg_length
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Usage line, if one was set.
    #[must_use]
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// How the command is selected.
    #[must_use]
    pub const fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// True for commands invoked by prefix and name.
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        matches!(self.kind, CommandKind::Explicit)
    }

    /// Whether the dispatcher may select this command.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enables or disables the command. Disabled commands stay registered.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Runs the action for `user`.
    ///
    /// Fails with [`Error::Unauthorized`] when the user's level is below the
    /// command's, and with [`Error::ExecutionFailure`] when the action reports
    /// failure. Errors raised by the action are returned as-is.
    #[instrument(skip(self, state, user, args), fields(command = %self.name, user = %user.id))]
    pub async fn execute_action(
        &self,
        state: &OnMessageState<'_>,
        user: &user::Model,
        args: &[String],
    ) -> Result<()> {
        if user.access_level < self.access_level {
            return Err(Error::Unauthorized {
                command: self.name.clone(),
                required: self.access_level,
                actual: user.access_level,
            });
        }
        if self.action.execute(state, args).await? {
            Ok(())
        } else {
            Err(Error::ExecutionFailure {
                command: self.name.clone(),
            })
        }
    }

    /// Runs the gate for an author without a user record.
    ///
    /// Only commands open to the lowest tier run; anything else is skipped
    /// without an error.
    pub async fn execute_action_no_user(
        &self,
        state: &OnMessageState<'_>,
        args: &[String],
    ) -> Result<()> {
        if self.access_level > AccessLevel::LOWEST {
            debug!("Skipping `{}` for an unregistered author.", self.name);
            return Ok(());
        }
        let placeholder = user::Model::placeholder(state.message().author_id.to_string());
        self.execute_action(state, &placeholder, args).await
    }

    /// Runs the action only if `user` is allowed to, skipping silently
    /// otherwise. Returns whether the action ran and reported success. Action
    /// errors still propagate.
    pub async fn execute_action_no_warning(
        &self,
        state: &OnMessageState<'_>,
        user: &user::Model,
        args: &[String],
    ) -> Result<bool> {
        if user.access_level < self.access_level {
            debug!("Quietly skipping `{}` for {}.", self.name, user.id);
            return Ok(false);
        }
        self.action.execute(state, args).await
    }

    /// Evaluates the command's trigger. Explicit commands never fire.
    pub async fn try_trigger(&self, state: &OnMessageState<'_>) -> Result<bool> {
        match &self.kind {
            CommandKind::Triggered(trigger) => trigger.execute(state).await,
            CommandKind::Explicit => Ok(false),
        }
    }
}
