//! Unified error types for the bot.
//!
//! Every fallible operation in the crate returns [`Result`]. Command and trigger
//! errors travel back to the dispatch loop untouched, which decides whether they
//! become a reply or just a log line.

use crate::core::access_level::AccessLevel;
use thiserror::Error;

/// All errors the bot can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// The invoking user is below the command's required access level.
    #[error("`{command}` requires {required}, but you are {actual}")]
    Unauthorized {
        /// Invocation string of the rejected command
        command: String,
        /// Minimum level the command asks for
        required: AccessLevel,
        /// Level the invoking user actually has
        actual: AccessLevel,
    },

    /// An action ran to completion but reported failure.
    #[error("`{command}` failed to execute")]
    ExecutionFailure {
        /// Invocation string of the failed command
        command: String,
    },

    /// Fewer arguments than the command declares were supplied.
    #[error("`{command}` expects {expected} argument(s) but got {got}")]
    InvalidArguments {
        /// Invocation string of the command
        command: String,
        /// Declared argument count
        expected: usize,
        /// Number of arguments actually supplied
        got: usize,
    },

    /// The persistence connection could not be opened. Fatal at startup.
    #[error("Database connection error: {message}")]
    Connection {
        /// Driver-level description of the failure
        message: String,
    },

    /// A single persistence operation failed or returned a malformed record.
    #[error("Database error: {message}")]
    Persistence {
        /// Description of the failed operation
        message: String,
    },

    /// One or more bootstrap procedures failed; the readiness flag stays false.
    #[error("Database bootstrap failed for: {}", procedures.join(", "))]
    Bootstrap {
        /// Names of the procedures that failed
        procedures: Vec<&'static str>,
    },

    /// A call to an external service (chat platform, conversational AI) failed.
    #[error("External service error: {message}")]
    ExternalService {
        /// Description of the failed call
        message: String,
    },

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// A required environment variable is missing.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Error bubbled up from the Discord framework.
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        Self::Persistence {
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Persistence {
            message: format!("malformed document: {value}"),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
