//! User entity - One record per registered platform user.
//!
//! The primary key is the platform user id, so a second record for the same
//! user cannot exist.

use crate::core::access_level::AccessLevel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Platform user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Privilege tier, stored as an integer
    pub access_level: AccessLevel,
    /// When the user registered
    pub date_registered: DateTimeUtc,
    /// Wallet balance spent on feeding Brad
    pub dotma_coin: i64,
    /// Secondary wallet balance
    pub brad_coin: i64,
    /// Accumulated experience points
    pub experience: i64,
    /// Level derived from experience
    pub level: i32,
    /// Display title shown on the profile
    pub title: String,
}

/// Users have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Title every new profile starts with.
pub const DEFAULT_TITLE: &str = "Newcomer";

impl Model {
    /// Builds an unsaved, minimal-privilege stand-in for an author with no record.
    #[must_use]
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            access_level: AccessLevel::LOWEST,
            date_registered: chrono::Utc::now(),
            dotma_coin: 0,
            brad_coin: 0,
            experience: 0,
            level: 0,
            title: "The unregistered".to_string(),
        }
    }
}
