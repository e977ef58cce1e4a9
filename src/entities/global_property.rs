//! Global property entity - The singleton holding process-wide settings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Global property database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "global_properties")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Whether the conversational chat trigger may answer
    pub chat_enabled: bool,
    /// When the singleton was created
    pub created_at: DateTimeUtc,
}

/// `GlobalProperty` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
