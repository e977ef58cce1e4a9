//! Framework-agnostic bot core.
//!
//! Nothing in here depends on serenity; the chat platform is reached through
//! the traits in [`platform`].

pub mod access_level;
pub mod action;
pub mod brad;
pub mod chat;
pub mod command;
pub mod database;
pub mod dispatch;
pub mod migration;
pub mod platform;
pub mod prefix;
pub mod property;
pub mod state;
pub mod user;
