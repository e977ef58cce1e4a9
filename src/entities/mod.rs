//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the four persisted record families.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod brad_property;
pub mod global_property;
pub mod guild_property;
pub mod user;

// Re-export specific types to avoid conflicts
pub use brad_property::{
    Column as BradPropertyColumn, Entity as BradProperty, Model as BradPropertyModel,
};
pub use global_property::{
    Column as GlobalPropertyColumn, Entity as GlobalProperty, Model as GlobalPropertyModel,
};
pub use guild_property::{
    Column as GuildPropertyColumn, Entity as GuildProperty, Model as GuildPropertyModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
