//! Brad commands - feeding, inspecting and resetting the community pet.

use crate::core::action::Action;
use crate::core::brad::WeightLedger;
use crate::core::state::OnMessageState;
use crate::core::user;
use crate::errors::Result;
use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, warn};

/// How many contributors `brad` lists.
const TOP_CONTRIBUTORS: usize = 5;

/// Spends DotmaCoins to grow Brad.
pub struct FeedAction {
    ledger: Arc<WeightLedger>,
}

impl FeedAction {
    /// Feeds through the shared `ledger`.
    #[must_use]
    pub const fn new(ledger: Arc<WeightLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Action for FeedAction {
    async fn execute(&self, state: &OnMessageState<'_>, args: &[String]) -> Result<bool> {
        let Some(feeder) = state.user() else {
            return Ok(false);
        };
        let amount = match args.first().map(|raw| raw.parse::<i64>()) {
            Some(Ok(amount)) if amount > 0 => amount,
            _ => {
                state
                    .reply("Brad only eats a positive, whole number of DotmaCoins.")
                    .await?;
                return Ok(true);
            }
        };

        if !user::debit_dotma_coin(state.db(), &feeder.id, amount).await? {
            state.reply("You don't have enough DotmaCoins.").await?;
            return Ok(true);
        }

        let feeding = match self.ledger.feed(&feeder.id, amount).await {
            Ok(feeding) => feeding,
            Err(e) => {
                warn!("Feeding failed, refunding {amount} DotmaCoins to {}.", feeder.id);
                if let Err(refund_error) =
                    user::credit_dotma_coin(state.db(), &feeder.id, amount).await
                {
                    error!(
                        "Refund of {amount} DotmaCoins to {} failed: {refund_error}",
                        feeder.id
                    );
                }
                return Err(e);
            }
        };
        state
            .reply(&format!(
                "{} fed Brad {amount} DotmaCoins. Brad now weighs {:.4}kg.",
                state.message().author_name,
                feeding.record.weight
            ))
            .await?;

        if let Some(reached) = feeding.reached_goal {
            state
                .reply(&format!(
                    "Brad reached his goal of {reached}kg! Next goal: {}kg.",
                    feeding.record.weight_goal
                ))
                .await?;
        }
        Ok(true)
    }
}

/// Shows Brad's weight, goal and the current run's top contributors.
pub struct BradAction {
    ledger: Arc<WeightLedger>,
}

impl BradAction {
    /// Reads through the shared `ledger`.
    #[must_use]
    pub const fn new(ledger: Arc<WeightLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Action for BradAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        let record = self.ledger.current().await?;
        let mut text = format!(
            "**Brad**\nWeight: {:.4}kg\nGoal: {}kg\n",
            record.weight, record.weight_goal
        );
        let top = record.top_contributors(TOP_CONTRIBUTORS);
        if top.is_empty() {
            text.push_str("Nobody has fed Brad this run.");
        } else {
            text.push_str("Top feeders this run:\n");
            for (rank, contributor) in top.iter().enumerate() {
                let _ = writeln!(
                    text,
                    "{}. <@{}> - {} DotmaCoins",
                    rank + 1,
                    contributor.id,
                    contributor.contribution
                );
            }
        }
        state.reply(&text).await?;
        Ok(true)
    }
}

/// Starts a new run by clearing the current-run ledger.
pub struct ResetRunAction {
    ledger: Arc<WeightLedger>,
}

impl ResetRunAction {
    /// Resets through the shared `ledger`.
    #[must_use]
    pub const fn new(ledger: Arc<WeightLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Action for ResetRunAction {
    async fn execute(&self, state: &OnMessageState<'_>, _args: &[String]) -> Result<bool> {
        self.ledger.reset_current_run().await?;
        state.reply("Current run reset.").await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::access_level::AccessLevel;
    use crate::core::platform::PresenceUpdater;
    use crate::entities::BradProperty;
    use crate::errors::Error;
    use crate::test_utils::{TestHarness, create_test_user};
    use sea_orm::EntityTrait;

    fn ledger_for(harness: &TestHarness) -> Arc<WeightLedger> {
        let presence: Arc<dyn PresenceUpdater> = harness.platform.clone();
        Arc::new(WeightLedger::new(harness.db().clone(), presence))
    }

    #[tokio::test]
    async fn test_feed_debits_wallet_and_grows_brad() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let ledger = ledger_for(&harness);
        let feeder = create_test_user(harness.db(), "7", AccessLevel::Registered, 500).await?;
        let state = harness.state("!f feed 300", Some(feeder));

        assert!(FeedAction::new(Arc::clone(&ledger)).execute(&state, &["300".to_string()]).await?);

        assert_eq!(user::find_user(harness.db(), "7").await?.unwrap().dotma_coin, 200);
        let record = ledger.current().await?;
        assert_eq!(record.weight, 70.3);
        assert_eq!(record.contributors[0].contribution, 300);
        assert!(harness.platform.sent_texts()[0].contains("70.3000kg"));
        Ok(())
    }

    #[tokio::test]
    async fn test_feed_without_funds_changes_nothing() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let ledger = ledger_for(&harness);
        let feeder = create_test_user(harness.db(), "7", AccessLevel::Registered, 10).await?;
        let state = harness.state("!f feed 50", Some(feeder));

        assert!(FeedAction::new(Arc::clone(&ledger)).execute(&state, &["50".to_string()]).await?);
        assert!(FeedAction::new(Arc::clone(&ledger)).execute(&state, &["-5".to_string()]).await?);

        assert_eq!(user::find_user(harness.db(), "7").await?.unwrap().dotma_coin, 10);
        assert_eq!(ledger.current().await?.weight, 70.0);
        assert_eq!(
            harness.platform.sent_texts()[0],
            "You don't have enough DotmaCoins."
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_reaching_goal_moves_it() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let ledger = ledger_for(&harness);
        let feeder = create_test_user(harness.db(), "7", AccessLevel::Registered, 5000).await?;
        let state = harness.state("!f feed 1200", Some(feeder));

        FeedAction::new(Arc::clone(&ledger))
            .execute(&state, &["1200".to_string()])
            .await?;

        let record = ledger.current().await?;
        assert_eq!(record.weight, 71.2);
        assert_eq!(record.weight_goal, 72.0);
        assert!(harness.platform.sent_texts()[1].contains("Next goal: 72kg"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_feeding_refunds_and_keeps_original_error() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let ledger = ledger_for(&harness);
        BradProperty::delete_many().exec(harness.db()).await?;
        let feeder = create_test_user(harness.db(), "7", AccessLevel::Registered, 500).await?;
        let state = harness.state("!f feed 300", Some(feeder));

        let result = FeedAction::new(ledger).execute(&state, &["300".to_string()]).await;
        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert_eq!(user::find_user(harness.db(), "7").await?.unwrap().dotma_coin, 500);
        assert!(harness.platform.sent_texts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_brad_and_reset_run() -> Result<()> {
        let harness = TestHarness::new(&[]).await?;
        let ledger = ledger_for(&harness);
        ledger.increment_weight("7", 40).await?;
        ledger.increment_weight("8", 90).await?;
        let state = harness.state("!f brad", None);

        BradAction::new(Arc::clone(&ledger)).execute(&state, &[]).await?;
        let text = &harness.platform.sent_texts()[0];
        assert!(text.find("<@8>").unwrap() < text.find("<@7>").unwrap());

        ResetRunAction::new(Arc::clone(&ledger)).execute(&state, &[]).await?;
        BradAction::new(Arc::clone(&ledger)).execute(&state, &[]).await?;
        assert!(harness.platform.sent_texts()[2].contains("Nobody has fed Brad"));
        assert_eq!(ledger.current().await?.contributors_all_time.len(), 2);
        Ok(())
    }
}
