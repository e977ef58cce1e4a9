//! Migrators create the baseline records of one family.
//!
//! They do the writing only. Deciding *whether* anything is missing is the
//! job of [`crate::core::database::DatabaseCore`].

use crate::{
    core::{access_level::AccessLevel, brad, property, user},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

/// Creates developer profiles.
pub struct UserMigrator<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserMigrator<'a> {
    /// Creates a migrator writing through `db`.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Makes sure every id in `ids` has a developer profile.
    ///
    /// Ids without any record get a new one. Ids that already have a record at
    /// a lower tier are promoted, since a second record for the same user
    /// cannot exist. Returns the number of profiles written.
    pub async fn create_models(&self, ids: &[String]) -> Result<usize> {
        let mut saved = 0;
        for user_id in ids {
            let outcome = match user::find_user(self.db, user_id).await {
                Ok(Some(existing)) if existing.access_level == AccessLevel::Developer => continue,
                Ok(Some(_)) => {
                    warn!("User {user_id} exists below developer tier. Promoting.");
                    user::set_access_level(self.db, user_id, AccessLevel::Developer)
                        .await
                        .map(|_| ())
                }
                Ok(None) => user::create_user(self.db, user_id, AccessLevel::Developer, 0)
                    .await
                    .map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                error!("Failed to save user {user_id}: {e}.");
                return Err(e);
            }
            saved += 1;
            info!("Dev user saved {saved} of {}.", ids.len());
        }
        Ok(saved)
    }
}

/// Creates the global settings singleton.
pub struct GlobalPropertyMigrator<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GlobalPropertyMigrator<'a> {
    /// Creates a migrator writing through `db`.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the default singleton.
    pub async fn create_models(&self) -> Result<()> {
        property::create_default_global_properties(self.db)
            .await
            .inspect(|_| info!("Default global properties saved."))
            .inspect_err(|e| error!("Failed to save global properties: {e}."))?;
        Ok(())
    }
}

/// Creates per-guild records.
pub struct GuildPropertyMigrator<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildPropertyMigrator<'a> {
    /// Creates a migrator writing through `db`.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a record for each id in `guild_ids`.
    pub async fn create_models(&self, guild_ids: &[&str]) -> Result<usize> {
        for (index, guild_id) in guild_ids.iter().enumerate() {
            property::create_guild_property(self.db, guild_id)
                .await
                .inspect_err(|e| error!("Failed to save guild property {guild_id}: {e}."))?;
            info!("Guild property saved {} of {}.", index + 1, guild_ids.len());
        }
        Ok(guild_ids.len())
    }
}

/// Creates the Brad singleton.
pub struct BradPropertyMigrator<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BradPropertyMigrator<'a> {
    /// Creates a migrator writing through `db`.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the singleton with the configured default weight.
    pub async fn create_models(&self, default_weight: f64) -> Result<()> {
        brad::create_default_brad_property(self.db, default_weight)
            .await
            .inspect(|_| info!("Default brad properties saved."))
            .inspect_err(|e| error!("Failed to save brad properties: {e}."))?;
        Ok(())
    }
}
