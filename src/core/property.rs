//! Global and per-guild property records.

use crate::{
    entities::{GlobalProperty, GuildProperty, global_property, guild_property},
    errors::Result,
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Number of global property records. Anything but 1 means bootstrap has
/// not run or the singleton was tampered with.
pub async fn count_global_properties<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    GlobalProperty::find().count(db).await.map_err(Into::into)
}

/// The global settings singleton, if it exists.
pub async fn global_properties<C>(db: &C) -> Result<Option<global_property::Model>>
where
    C: ConnectionTrait,
{
    GlobalProperty::find()
        .order_by_asc(global_property::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts the default global settings record.
pub async fn create_default_global_properties<C>(db: &C) -> Result<global_property::Model>
where
    C: ConnectionTrait,
{
    let model = global_property::ActiveModel {
        chat_enabled: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Every stored guild record, including guilds the bot has since left.
pub async fn guild_properties<C>(db: &C) -> Result<Vec<guild_property::Model>>
where
    C: ConnectionTrait,
{
    GuildProperty::find()
        .order_by_asc(guild_property::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Looks up the record for one guild.
pub async fn find_guild_property<C>(db: &C, guild_id: &str) -> Result<Option<guild_property::Model>>
where
    C: ConnectionTrait,
{
    GuildProperty::find_by_id(guild_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts the default record for a guild.
pub async fn create_guild_property<C>(db: &C, guild_id: &str) -> Result<guild_property::Model>
where
    C: ConnectionTrait,
{
    let model = guild_property::ActiveModel {
        id: Set(guild_id.to_string()),
        registered_at: Set(chrono::Utc::now()),
    };
    Ok(model.insert(db).await?)
}
