//! Reactions evaluated on every message.

use crate::core::action::{Action, Trigger};
use crate::core::chat::{ChatService, strip_name};
use crate::core::property;
use crate::core::state::OnMessageState;
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Flavor replies clean themselves up after an hour.
pub const FLAVOR_REPLY_TTL: Duration = Duration::from_secs(60 * 60);

const PUBG_REPLY: &str =
    "PUBG aka PlayerUnknown's Battle Grounds is trash, Fortnite is better ^__^ fortnite?";

const FORTNITE_STYLES: [&str; 7] = [
    "OwO someone said fortnite? fortnite?",
    "AwoooooOOoo someone said fortnite? fortnite?",
    "Someone said fortnite :3 fortnite?",
    "Fortnite? fortnite?",
    "How do I draw triangles with vector transforms? fortnite?",
    "Its..its not like I wan...want to play fortnite or anything >///<",
    "Notices fortnite, Owo whats this? fortnite?",
];

/// True when `content` mentions `word`, ignoring case and whitespace.
/// Messages that look like `!` commands never match.
fn mentions(content: &str, word: &str) -> bool {
    if content.starts_with('!') {
        return false;
    }
    let squashed: String = content
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    squashed.contains(word)
}

/// Posts `text` and schedules its deletion.
async fn flavor_reply(state: &OnMessageState<'_>, text: &str) -> Result<bool> {
    let sent = state.reply(text).await?;
    state.platform().delete_message_after(sent, FLAVOR_REPLY_TTL);
    Ok(true)
}

/// Fires when a message mentions fortnite.
pub struct FortniteTrigger;

#[async_trait]
impl Trigger for FortniteTrigger {
    async fn execute(&self, state: &OnMessageState<'_>) -> Result<bool> {
        Ok(mentions(&state.message().content, "fortnite"))
    }
}

/// Posts one of the fortnite flavor lines and schedules its deletion.
pub struct FortniteAction;

#[async_trait]
impl Action for FortniteAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        let style = usize::try_from(state.message().message_id % FORTNITE_STYLES.len() as u64)
            .unwrap_or_default();
        flavor_reply(state, FORTNITE_STYLES[style]).await
    }
}

/// Fires when a message mentions pubg.
pub struct PubgTrigger;

#[async_trait]
impl Trigger for PubgTrigger {
    async fn execute(&self, state: &OnMessageState<'_>) -> Result<bool> {
        Ok(mentions(&state.message().content, "pubg"))
    }
}

/// Tells pubg players which game is better.
pub struct PubgAction;

#[async_trait]
impl Action for PubgAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        flavor_reply(state, PUBG_REPLY).await
    }
}

/// Fires when a message starts or ends with the bot's name and chat is
/// enabled globally.
pub struct ChatTrigger {
    bot_name: String,
}

impl ChatTrigger {
    /// Listens for `bot_name`.
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }
}

#[async_trait]
impl Trigger for ChatTrigger {
    async fn execute(&self, state: &OnMessageState<'_>) -> Result<bool> {
        if strip_name(&state.message().content, &self.bot_name).is_none() {
            return Ok(false);
        }
        let enabled = property::global_properties(state.db())
            .await?
            .is_some_and(|global| global.chat_enabled);
        if !enabled {
            debug!("Chat is disabled globally.");
        }
        Ok(enabled)
    }
}

/// Reply used when the chat service cannot answer.
pub const CHAT_FALLBACK: &str = "I'm not feeling very chatty right now. Ask me again later!";

/// Answers through the conversational service.
pub struct ChatAction {
    bot_name: String,
    service: Arc<dyn ChatService>,
}

impl ChatAction {
    /// Answers prompts addressed to `bot_name` with `service`.
    pub fn new(bot_name: impl Into<String>, service: Arc<dyn ChatService>) -> Self {
        Self {
            bot_name: bot_name.into(),
            service,
        }
    }
}

#[async_trait]
impl Action for ChatAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        let Some(prompt) = strip_name(&state.message().content, &self.bot_name) else {
            return Ok(false);
        };
        let answer = match self.service.respond(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Chat service failed: {e}");
                CHAT_FALLBACK.to_string()
            }
        };
        state.reply(&answer).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{GlobalProperty, global_property};
    use crate::test_utils::{FailingChatService, FixedChatService, TestHarness};
    use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

    #[test]
    fn test_mention_matching() {
        assert!(mentions("anyone up for FORT NITE", "fortnite"));
        assert!(mentions("fort\tnite later?", "fortnite"));
        assert!(!mentions("!fortnite", "fortnite"));
        assert!(!mentions("fort night", "fortnite"));
        assert!(mentions("P U B G tonight", "pubg"));
        assert!(!mentions("!f pubg", "pubg"));
    }

    #[tokio::test]
    async fn test_fortnite_reply_is_deleted_after_an_hour() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let state = harness.state("fortnite?", None);
        assert!(FortniteTrigger.execute(&state).await?);
        assert!(FortniteAction.execute(&state, &[]).await?);

        let sent = harness.platform.sent();
        assert_eq!(sent.len(), 1);
        assert!(FORTNITE_STYLES.contains(&sent[0].1.as_str()));
        assert_eq!(harness.platform.scheduled(), vec![(sent[0].0, FLAVOR_REPLY_TTL)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_pubg_reply_is_deleted_after_an_hour() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let state = harness.state("anyone for PUBG?", None);
        assert!(PubgTrigger.execute(&state).await?);
        assert!(!FortniteTrigger.execute(&state).await?);
        assert!(PubgAction.execute(&state, &[]).await?);

        let sent = harness.platform.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, PUBG_REPLY);
        assert_eq!(harness.platform.scheduled(), vec![(sent[0].0, FLAVOR_REPLY_TTL)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_trigger_respects_global_flag() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let trigger = ChatTrigger::new("mrfortnite");
        assert!(trigger.execute(&harness.state("mrfortnite hi", None)).await?);
        assert!(!trigger.execute(&harness.state("hello", None)).await?);

        let global = GlobalProperty::find().one(harness.db()).await?.unwrap();
        let mut active: global_property::ActiveModel = global.into_active_model();
        active.chat_enabled = Set(false);
        active.update(harness.db()).await?;
        assert!(!trigger.execute(&harness.state("mrfortnite hi", None)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_action_answers_or_falls_back() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let state = harness.state("how are you mrfortnite", None);

        let fixed = ChatAction::new("mrfortnite", Arc::new(FixedChatService("fine".to_string())));
        assert!(fixed.execute(&state, &[]).await?);
        let failing = ChatAction::new("mrfortnite", Arc::new(FailingChatService));
        assert!(failing.execute(&state, &[]).await?);

        assert_eq!(
            harness.platform.sent_texts(),
            vec!["fine".to_string(), CHAT_FALLBACK.to_string()]
        );
        Ok(())
    }
}
