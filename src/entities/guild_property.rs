//! Guild property entity - One record per guild the bot has joined.
//! Records are never removed when the bot leaves a guild.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guild property database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guild_properties")]
pub struct Model {
    /// Platform guild id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// When the guild was first seen
    pub registered_at: DateTimeUtc,
}

/// `GuildProperty` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
