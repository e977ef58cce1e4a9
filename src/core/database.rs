//! Connection lifecycle and startup bootstrap.
//!
//! [`DatabaseCore::generate_models_if_empty`] makes sure the baseline records
//! exist: one developer profile per configured developer id, the global
//! settings singleton, one record per joined guild and the Brad singleton.
//! The four procedures run concurrently and the readiness flag flips only when
//! all of them succeed. Records written by a procedure are kept even if another
//! procedure fails; nothing is rolled back.

use crate::{
    config::{AppConfig, database},
    core::{
        access_level::AccessLevel,
        brad,
        migration::{
            BradPropertyMigrator, GlobalPropertyMigrator, GuildPropertyMigrator, UserMigrator,
        },
        property, user,
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, instrument, warn};

/// Owns the persistence connection and the readiness flag.
#[derive(Debug)]
pub struct DatabaseCore {
    connection: DatabaseConnection,
    developer_ids: Vec<String>,
    default_weight: f64,
    ready: AtomicBool,
}

impl DatabaseCore {
    /// Wraps an already open connection. The core starts out not ready.
    #[must_use]
    pub fn new(connection: DatabaseConnection, developer_ids: Vec<String>, default_weight: f64) -> Self {
        debug!("Database core created.");
        Self {
            connection,
            developer_ids,
            default_weight,
            ready: AtomicBool::new(false),
        }
    }

    /// Opens the connection and creates missing tables.
    ///
    /// Any error here is a connection failure and should abort startup.
    #[instrument(skip(config))]
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let connection = database::create_connection(&config.database_url).await?;
        database::create_tables(&connection)
            .await
            .map_err(|e| Error::Connection {
                message: e.to_string(),
            })?;
        Ok(Self::new(
            connection,
            config.developer_ids.clone(),
            config.brad.default_weight,
        ))
    }

    /// The shared connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// True once a bootstrap run has fully succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Runs all four bootstrap procedures concurrently and waits for every one
    /// of them. Marks the core ready only if none failed.
    #[instrument(skip(self, guild_ids), fields(guilds = guild_ids.len()))]
    pub async fn generate_models_if_empty(&self, guild_ids: &[String]) -> Result<()> {
        let (users, global, guilds, brad) = tokio::join!(
            self.generate_dev_user_models(),
            self.generate_global_property_model(),
            self.generate_guild_property_models(guild_ids),
            self.generate_brad_property_model(),
        );

        let mut failed = Vec::new();
        let mut check = |name: &'static str, outcome: Option<Error>| {
            if let Some(e) = outcome {
                error!("Bootstrap procedure `{name}` failed: {e}");
                failed.push(name);
            }
        };
        check("dev users", users.err());
        check("global properties", global.err());
        check("guild properties", guilds.err());
        check("brad properties", brad.err());

        if failed.is_empty() {
            self.ready.store(true, Ordering::Release);
            info!("Database connected successfully.");
            Ok(())
        } else {
            Err(Error::Bootstrap { procedures: failed })
        }
    }

    /// Creates profiles for configured developers that lack one. Never
    /// removes developer records. Returns how many profiles were written.
    pub async fn generate_dev_user_models(&self) -> Result<usize> {
        if self.developer_ids.is_empty() {
            return Ok(0);
        }
        let developers = user::find_by_access_level(&self.connection, AccessLevel::Developer).await?;
        let missing: Vec<String> = self
            .developer_ids
            .iter()
            .filter(|id| !developers.iter().any(|dev| &dev.id == *id))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(0);
        }

        warn!(
            "Dev user models do not match ({} stored, {} configured). Creating {} dev profile(s).",
            developers.len(),
            self.developer_ids.len(),
            missing.len()
        );
        UserMigrator::new(&self.connection)
            .create_models(&missing)
            .await
    }

    /// Creates the global settings singleton if there is none. Returns
    /// whether it was created.
    pub async fn generate_global_property_model(&self) -> Result<bool> {
        if property::count_global_properties(&self.connection).await? > 0 {
            return Ok(false);
        }
        warn!("Global properties document has not been setup. Creating default profile.");
        GlobalPropertyMigrator::new(&self.connection)
            .create_models()
            .await?;
        Ok(true)
    }

    /// Creates a record for each joined guild that has none. Records of
    /// guilds the bot has left are left alone.
    pub async fn generate_guild_property_models(&self, guild_ids: &[String]) -> Result<usize> {
        let existing = property::guild_properties(&self.connection).await?;
        let mut missing: Vec<&str> = Vec::new();
        for guild_id in guild_ids {
            let known = existing.iter().any(|g| &g.id == guild_id);
            if !known && !missing.contains(&guild_id.as_str()) {
                warn!(
                    "Unregistered guild detected. Creating guild property document for {guild_id}."
                );
                missing.push(guild_id);
            }
        }
        if missing.is_empty() {
            return Ok(0);
        }
        GuildPropertyMigrator::new(&self.connection)
            .create_models(&missing)
            .await
    }

    /// Creates the Brad singleton if there is none. Returns whether it was
    /// created.
    pub async fn generate_brad_property_model(&self) -> Result<bool> {
        if brad::count_brad_properties(&self.connection).await? > 0 {
            return Ok(false);
        }
        warn!("Brad properties document has not been setup. Creating default profile.");
        BradPropertyMigrator::new(&self.connection)
            .create_models(self.default_weight)
            .await?;
        Ok(true)
    }

    /// Creates the record for a guild joined while running. Returns whether
    /// a record was created.
    #[instrument(skip(self))]
    pub async fn ensure_guild_property(&self, guild_id: &str) -> Result<bool> {
        if property::find_guild_property(&self.connection, guild_id)
            .await?
            .is_some()
        {
            return Ok(false);
        }
        warn!("Joined unregistered guild {guild_id}. Creating guild property document.");
        property::create_guild_property(&self.connection, guild_id).await?;
        Ok(true)
    }

    /// Closes the connection and clears the readiness flag.
    pub async fn close(self) -> Result<()> {
        warn!("Connection to DB closed.");
        self.ready.store(false, Ordering::Release);
        self.connection.close().await?;
        Ok(())
    }
}
