//! Units of behavior owned by commands.

use crate::core::state::OnMessageState;
use crate::errors::Result;
use async_trait::async_trait;

/// A named unit of work run when a command is invoked.
///
/// Returns `Ok(true)` on success and `Ok(false)` when the work could not be
/// done; the command gate turns `false` into an execution failure. Errors are
/// passed through to the caller unchanged.
#[async_trait]
pub trait Action: Send + Sync {
    /// Performs the action for one message.
    async fn execute(&self, state: &OnMessageState<'_>, args: &[String]) -> Result<bool>;
}

/// A predicate evaluated on every inbound message.
///
/// Returns `Ok(true)` when the condition held and any effect it performs
/// completed, which lets the owning command's action run.
#[async_trait]
pub trait Trigger: Send + Sync {
    /// Evaluates the trigger against one message.
    async fn execute(&self, state: &OnMessageState<'_>) -> Result<bool>;
}

/// Default action installed on every command until a concrete one replaces it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAction;

#[async_trait]
impl Action for NoopAction {
    async fn execute(&self, _state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        Ok(true)
    }
}
