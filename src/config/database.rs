//! Database configuration module.
//!
//! This module opens the single persistence connection and creates the four
//! record tables from their `SeaORM` entity definitions. Table creation uses
//! `IF NOT EXISTS`, so it is safe on every startup.

use crate::entities::{BradProperty, GlobalProperty, GuildProperty, User};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{error, info, instrument};

/// Establishes the connection. Any driver error is reported as
/// [`Error::Connection`], which callers treat as fatal.
#[instrument(skip(database_url))]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(|e| {
        error!("Error connecting to DB: {e}.");
        Error::Connection {
            message: e.to_string(),
        }
    })
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table the bot needs if it does not already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_for(db, &schema, User).await?;
    create_table_for(db, &schema, GlobalProperty).await?;
    create_table_for(db, &schema, GuildProperty).await?;
    create_table_for(db, &schema, BradProperty).await?;

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        brad_property::Model as BradPropertyModel, global_property::Model as GlobalPropertyModel,
        guild_property::Model as GuildPropertyModel, user::Model as UserModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<GlobalPropertyModel> = GlobalProperty::find().limit(1).all(&db).await?;
        let _: Vec<GuildPropertyModel> = GuildProperty::find().limit(1).all(&db).await?;
        let _: Vec<BradPropertyModel> = BradProperty::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_url_is_a_connection_error() {
        let result = create_connection("definitely-not-a-scheme://nowhere").await;
        assert!(matches!(result, Err(Error::Connection { .. })));
    }
}
