//! Privilege tiers used by every authorization check.
//!
//! Tiers are compared by their position in the declaration order, never by name.
//! The same enum is stored on user records as an integer column.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered privilege scale, lowest first.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum AccessLevel {
    /// No user record exists for the author
    #[sea_orm(num_value = 0)]
    Unregistered,
    /// Ran `register`
    #[sea_orm(num_value = 1)]
    Registered,
    /// Trusted to clean up channels
    #[sea_orm(num_value = 2)]
    Moderator,
    /// Server administrators
    #[sea_orm(num_value = 3)]
    Administrator,
    /// Bot developers, seeded from configuration at startup
    #[sea_orm(num_value = 4)]
    Developer,
}

impl AccessLevel {
    /// The lowest tier, granted to anyone without a user record.
    pub const LOWEST: Self = Self::Unregistered;

    /// Human-readable tier name used in replies.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unregistered => "Unregistered",
            Self::Registered => "Registered",
            Self::Moderator => "Moderator",
            Self::Administrator => "Administrator",
            Self::Developer => "Developer",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
