//! Conversational-AI seam used by the chat trigger.

use crate::config::ChatServiceSettings;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Produces a conversational reply to a prompt.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Returns the service's answer to `prompt`.
    async fn respond(&self, prompt: &str) -> Result<String>;
}

/// Installed when credentials are missing; every call fails so the caller
/// falls back to its canned reply.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableChatService;

#[async_trait]
impl ChatService for UnavailableChatService {
    async fn respond(&self, _prompt: &str) -> Result<String> {
        Err(Error::ExternalService {
            message: "chat service is not configured".to_string(),
        })
    }
}

/// Picks the chat service for the given credentials.
///
/// No conversational backend ships with the bot, so this always returns
/// [`UnavailableChatService`], even when every `CHATBOT_*` credential is set.
/// The credentials are only checked for completeness and otherwise unused.
#[must_use]
pub fn service_from_settings(settings: &ChatServiceSettings) -> Arc<dyn ChatService> {
    if !settings.is_complete() {
        warn!("Failed to initialize chat service. Missing keys.");
    }
    Arc::new(UnavailableChatService)
}

/// Strips `name` from the start and end of `content`, ignoring ASCII case and
/// surrounding whitespace. Returns `None` if `name` appears at neither end or
/// nothing is left after stripping.
#[must_use]
pub fn strip_name(content: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let mut text = content.trim();
    let mut found = false;

    if text.len() >= name.len()
        && text.is_char_boundary(name.len())
        && text[..name.len()].eq_ignore_ascii_case(name)
    {
        text = text[name.len()..].trim_start();
        found = true;
    }
    if text.len() >= name.len() {
        let start = text.len() - name.len();
        if text.is_char_boundary(start) && text[start..].eq_ignore_ascii_case(name) {
            text = text[..start].trim_end();
            found = true;
        }
    }

    let text = text.trim_matches(|c: char| c == ',' || c.is_whitespace());
    (found && !text.is_empty()).then(|| text.to_string())
}
