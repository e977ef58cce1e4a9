//! Brad property entity - The weight-ledger singleton.
//!
//! Both contributor ledgers are stored as JSON arrays of `{ id, contribution }`
//! pairs. They are decoded into typed values by [`crate::core::brad`] and never
//! read as raw JSON anywhere else.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Brad property database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "brad_properties")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Current weight in kilograms
    pub weight: f64,
    /// Next weight milestone
    pub weight_goal: f64,
    /// Current-run ledger, cleared by `resetrun`
    pub contributors: Json,
    /// All-time ledger, never cleared
    pub contributors_all_time: Json,
}

/// `BradProperty` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
