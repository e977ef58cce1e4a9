/// Database configuration and connection management
pub mod database;

/// Application settings loaded from config.toml and the environment
pub mod settings;

pub use settings::{AppConfig, BradSettings, ChatServiceSettings, UserSettings};
