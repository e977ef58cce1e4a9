//! Brad, the shared weight ledger.
//!
//! Every user can feed Brad, so the singleton record is written by many
//! concurrent message handlers. All writes go through [`WeightLedger`], which
//! funnels them through one async mutex and performs each read-modify-write
//! inside a database transaction. Nothing is retried.

use crate::{
    core::platform::PresenceUpdater,
    entities::{BradProperty, brad_property},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveValue::Unchanged, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Kilograms Brad gains per DotmaCoin fed.
pub const KG_PER_COIN: f64 = 0.001;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Converts a DotmaCoin amount into a weight delta, rounded to four decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)] // coin amounts are far below 2^52
pub fn coins_to_kg(amount: i64) -> f64 {
    round4(amount as f64 * KG_PER_COIN)
}

/// Status text published after every weight change.
#[must_use]
pub fn presence_text(weight: f64) -> String {
    format!("Brad's Weight: {weight:.4}kg")
}

/// One contributor's accumulated total in a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Contributor's platform user id
    pub id: String,
    /// Total DotmaCoins contributed
    pub contribution: i64,
}

/// Adds `amount` to `id`'s entry, appending a new entry if there is none.
pub fn credit(ledger: &mut Vec<Contribution>, id: &str, amount: i64) {
    match ledger.iter_mut().find(|entry| entry.id == id) {
        Some(entry) => entry.contribution += amount,
        None => ledger.push(Contribution {
            id: id.to_string(),
            contribution: amount,
        }),
    }
}

/// Typed view of the Brad singleton.
#[derive(Debug, Clone, PartialEq)]
pub struct BradRecord {
    /// Row id
    pub id: i32,
    /// Current weight in kilograms
    pub weight: f64,
    /// Next milestone
    pub weight_goal: f64,
    /// Current-run ledger
    pub contributors: Vec<Contribution>,
    /// All-time ledger
    pub contributors_all_time: Vec<Contribution>,
}

impl TryFrom<brad_property::Model> for BradRecord {
    type Error = Error;

    fn try_from(model: brad_property::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            weight: model.weight,
            weight_goal: model.weight_goal,
            contributors: serde_json::from_value(model.contributors)?,
            contributors_all_time: serde_json::from_value(model.contributors_all_time)?,
        })
    }
}

impl BradRecord {
    fn into_active_model(self) -> Result<brad_property::ActiveModel> {
        Ok(brad_property::ActiveModel {
            id: Unchanged(self.id),
            weight: Set(self.weight),
            weight_goal: Set(self.weight_goal),
            contributors: Set(serde_json::to_value(self.contributors)?),
            contributors_all_time: Set(serde_json::to_value(self.contributors_all_time)?),
        })
    }

    fn add_contribution(&mut self, contributor_id: &str, amount: i64) {
        credit(&mut self.contributors, contributor_id, amount);
        credit(&mut self.contributors_all_time, contributor_id, amount);
        self.weight = round4(self.weight + coins_to_kg(amount));
    }

    fn advance_goal(&mut self) {
        self.weight_goal = self.weight.floor() + 1.0;
    }

    /// True once the weight has met or passed the goal.
    #[must_use]
    pub fn goal_reached(&self) -> bool {
        self.weight >= self.weight_goal
    }

    /// The `n` biggest contributors of the current run, largest first.
    #[must_use]
    pub fn top_contributors(&self, n: usize) -> Vec<&Contribution> {
        let mut ranked: Vec<&Contribution> = self.contributors.iter().collect();
        ranked.sort_by(|a, b| b.contribution.cmp(&a.contribution));
        ranked.truncate(n);
        ranked
    }
}

/// Number of stored Brad records.
pub async fn count_brad_properties<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    BradProperty::find().count(db).await.map_err(Into::into)
}

/// Inserts a fresh singleton with `default_weight` and a goal one kilogram above it.
pub async fn create_default_brad_property<C>(db: &C, default_weight: f64) -> Result<BradRecord>
where
    C: ConnectionTrait,
{
    let model = brad_property::ActiveModel {
        weight: Set(default_weight),
        weight_goal: Set(default_weight + 1.0),
        contributors: Set(serde_json::json!([])),
        contributors_all_time: Set(serde_json::json!([])),
        ..Default::default()
    };
    model.insert(db).await?.try_into()
}

/// Loads and validates the singleton.
pub async fn load_brad<C>(db: &C) -> Result<Option<BradRecord>>
where
    C: ConnectionTrait,
{
    BradProperty::find()
        .order_by_asc(brad_property::Column::Id)
        .one(db)
        .await?
        .map(BradRecord::try_from)
        .transpose()
}

/// Outcome of [`WeightLedger::feed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feeding {
    /// Brad after the feeding
    pub record: BradRecord,
    /// Goal this feeding met, before it was moved
    pub reached_goal: Option<f64>,
}

/// Single-writer access to the Brad singleton.
pub struct WeightLedger {
    db: DatabaseConnection,
    presence: Arc<dyn PresenceUpdater>,
    writer: Mutex<()>,
}

impl WeightLedger {
    /// Creates the ledger. Build exactly one per process and share it.
    #[must_use]
    pub fn new(db: DatabaseConnection, presence: Arc<dyn PresenceUpdater>) -> Self {
        Self {
            db,
            presence,
            writer: Mutex::new(()),
        }
    }

    /// Reads the current state of the singleton.
    pub async fn current(&self) -> Result<BradRecord> {
        load_brad(&self.db).await?.ok_or_else(missing_record)
    }

    /// Publishes the current weight as the bot's status.
    pub async fn publish_presence(&self) -> Result<()> {
        let record = self.current().await?;
        self.presence.set_presence(&presence_text(record.weight));
        Ok(())
    }

    async fn modify<F>(&self, change: F) -> Result<BradRecord>
    where
        F: FnOnce(&mut BradRecord) + Send,
    {
        let _writer = self.writer.lock().await;
        let txn = self.db.begin().await?;
        let mut record = load_brad(&txn).await?.ok_or_else(missing_record)?;
        change(&mut record);
        record.clone().into_active_model()?.update(&txn).await?;
        txn.commit().await?;
        Ok(record)
    }

    /// Credits `amount` to the contributor in both ledgers and grows Brad by
    /// the converted weight.
    #[instrument(skip(self))]
    pub async fn increment_weight(&self, contributor_id: &str, amount: i64) -> Result<BradRecord> {
        let record = self
            .modify(|record| record.add_contribution(contributor_id, amount))
            .await?;
        debug!("Brad now weighs {:.4}kg.", record.weight);
        self.presence.set_presence(&presence_text(record.weight));
        Ok(record)
    }

    /// [`increment_weight`](Self::increment_weight) followed by
    /// [`set_new_weight_goal`](Self::set_new_weight_goal) when the goal is met,
    /// as one write. Concurrent feeds can never both claim the same goal.
    #[instrument(skip(self))]
    pub async fn feed(&self, contributor_id: &str, amount: i64) -> Result<Feeding> {
        let mut reached_goal = None;
        let record = self
            .modify(|record| {
                record.add_contribution(contributor_id, amount);
                if record.goal_reached() {
                    reached_goal = Some(record.weight_goal);
                    record.advance_goal();
                }
            })
            .await?;
        if let Some(goal) = reached_goal {
            info!("Brad reached {goal}kg, new goal: {}kg.", record.weight_goal);
        }
        self.presence.set_presence(&presence_text(record.weight));
        Ok(Feeding {
            record,
            reached_goal,
        })
    }

    /// Moves the goal to the next whole kilogram above the current weight.
    #[instrument(skip(self))]
    pub async fn set_new_weight_goal(&self) -> Result<BradRecord> {
        let record = self
            .modify(BradRecord::advance_goal)
            .await?;
        info!("New weight goal: {}kg.", record.weight_goal);
        Ok(record)
    }

    /// Clears the current-run ledger. Weight and the all-time ledger are kept.
    #[instrument(skip(self))]
    pub async fn reset_current_run(&self) -> Result<BradRecord> {
        let record = self.modify(|record| record.contributors.clear()).await?;
        info!("Current run reset.");
        Ok(record)
    }
}

fn missing_record() -> Error {
    Error::Persistence {
        message: "brad property record is missing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{RecordingPlatform, setup_test_db};

    async fn setup_ledger(default_weight: f64) -> Result<(WeightLedger, Arc<RecordingPlatform>)> {
        let db = setup_test_db().await?;
        create_default_brad_property(&db, default_weight).await?;
        let platform = Arc::new(RecordingPlatform::default());
        let presence: Arc<dyn PresenceUpdater> = platform.clone();
        Ok((WeightLedger::new(db, presence), platform))
    }

    #[test]
    fn test_coins_to_kg_is_rounded() {
        assert_eq!(coins_to_kg(1000), 1.0);
        assert_eq!(coins_to_kg(1), 0.001);
        assert_eq!(coins_to_kg(0), 0.0);
    }

    #[test]
    fn test_credit_upserts() {
        let mut ledger = Vec::new();
        credit(&mut ledger, "a", 5);
        credit(&mut ledger, "b", 1);
        credit(&mut ledger, "a", 7);
        assert_eq!(
            ledger,
            vec![
                Contribution {
                    id: "a".to_string(),
                    contribution: 12
                },
                Contribution {
                    id: "b".to_string(),
                    contribution: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_default_record() -> Result<()> {
        let (ledger, _) = setup_ledger(70.0).await?;
        let record = ledger.current().await?;
        assert_eq!(record.weight, 70.0);
        assert_eq!(record.weight_goal, 71.0);
        assert!(record.contributors.is_empty());
        assert!(record.contributors_all_time.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_increment_twice_sums_in_both_ledgers() -> Result<()> {
        let (ledger, platform) = setup_ledger(70.0).await?;

        let first = ledger.increment_weight("u1", 300).await?;
        assert!(first.weight > 70.0);
        let second = ledger.increment_weight("u1", 200).await?;
        assert!(second.weight > first.weight);

        let record = ledger.current().await?;
        assert_eq!(record.contributors.len(), 1);
        assert_eq!(record.contributors[0].contribution, 500);
        assert_eq!(record.contributors_all_time[0].contribution, 500);
        assert_eq!(record.weight, 70.5);
        assert_eq!(
            platform.presences().last().map(String::as_str),
            Some("Brad's Weight: 70.5000kg")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_current_run_keeps_all_time_and_weight() -> Result<()> {
        let (ledger, _) = setup_ledger(70.0).await?;
        ledger.increment_weight("u1", 100).await?;
        ledger.increment_weight("u2", 50).await?;
        let before = ledger.current().await?;

        let after = ledger.reset_current_run().await?;
        assert!(after.contributors.is_empty());
        assert_eq!(after.contributors_all_time, before.contributors_all_time);
        assert_eq!(after.weight, before.weight);
        assert_eq!(ledger.current().await?, after);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_new_weight_goal() -> Result<()> {
        let (ledger, _) = setup_ledger(70.0).await?;
        ledger.increment_weight("u1", 1500).await?;
        let record = ledger.set_new_weight_goal().await?;
        assert_eq!(record.weight, 71.5);
        assert_eq!(record.weight_goal, 72.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_feed_moves_goal_once() -> Result<()> {
        let (ledger, platform) = setup_ledger(70.0).await?;

        let below = ledger.feed("u1", 600).await?;
        assert_eq!(below.reached_goal, None);
        assert_eq!(below.record.weight_goal, 71.0);

        let crossing = ledger.feed("u2", 600).await?;
        assert_eq!(crossing.reached_goal, Some(71.0));
        assert_eq!(crossing.record.weight, 71.2);
        assert_eq!(crossing.record.weight_goal, 72.0);
        assert_eq!(
            platform.presences().last().map(String::as_str),
            Some("Brad's Weight: 71.2000kg")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_feeds_claim_a_goal_once() -> Result<()> {
        let (ledger, _) = setup_ledger(70.0).await?;
        let (a, b, c) = tokio::join!(
            ledger.feed("u1", 600),
            ledger.feed("u2", 600),
            ledger.feed("u3", 100),
        );
        let reached: Vec<f64> = [a?, b?, c?]
            .into_iter()
            .filter_map(|feeding| feeding.reached_goal)
            .collect();
        assert_eq!(reached, vec![71.0]);
        assert_eq!(ledger.current().await?.weight_goal, 72.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() -> Result<()> {
        let (ledger, _) = setup_ledger(0.0).await?;
        let (a, b, c, d) = tokio::join!(
            ledger.increment_weight("u1", 10),
            ledger.increment_weight("u2", 10),
            ledger.increment_weight("u1", 10),
            ledger.increment_weight("u3", 10),
        );
        a?;
        b?;
        c?;
        d?;

        let record = ledger.current().await?;
        assert_eq!(record.weight, 0.04);
        let total: i64 = record.contributors.iter().map(|c| c.contribution).sum();
        assert_eq!(total, 40);
        assert_eq!(record.contributors.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_ledger_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        brad_property::ActiveModel {
            weight: Set(1.0),
            weight_goal: Set(2.0),
            contributors: Set(serde_json::json!({ "not": "a list" })),
            contributors_all_time: Set(serde_json::json!([])),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        assert!(matches!(load_brad(&db).await, Err(Error::Persistence { .. })));
        Ok(())
    }

    #[test]
    fn test_top_contributors_sorted() {
        let record = BradRecord {
            id: 1,
            weight: 1.0,
            weight_goal: 2.0,
            contributors: vec![
                Contribution {
                    id: "a".to_string(),
                    contribution: 1,
                },
                Contribution {
                    id: "b".to_string(),
                    contribution: 9,
                },
                Contribution {
                    id: "c".to_string(),
                    contribution: 5,
                },
            ],
            contributors_all_time: Vec::new(),
        };
        let top: Vec<&str> = record
            .top_contributors(2)
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(top, vec!["b", "c"]);
        assert!(!record.goal_reached());
    }

    #[tokio::test]
    async fn test_missing_record_is_persistence_error() -> Result<()> {
        let db = setup_test_db().await?;
        let ledger = WeightLedger::new(db, Arc::new(RecordingPlatform::default()));
        assert!(matches!(
            ledger.increment_weight("u1", 1).await,
            Err(Error::Persistence { .. })
        ));
        Ok(())
    }
}
