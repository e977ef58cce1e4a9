use dotenvy::dotenv;
use nikku::{
    bot,
    config::AppConfig,
    core::database::DatabaseCore,
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = AppConfig::load(CONFIG_PATH)
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;
    info!(
        "Configuration loaded: {} prefix(es), {} developer(s).",
        app_config.prefixes.len(),
        app_config.developer_ids.len()
    );

    // 4. Connect to the database. Failing here is fatal.
    let database = DatabaseCore::connect(&app_config)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;

    // 5. Run the bot; bootstrap happens once the gateway reports ready
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, Arc::new(app_config), Arc::new(database)).await
}
