//! User record operations.

use crate::{
    core::access_level::AccessLevel,
    entities::{User, user},
    errors::Result,
};
use sea_orm::{Set, prelude::*, sea_query::Expr};

/// Looks up the user record for a platform user id.
pub async fn find_user<C>(db: &C, user_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// All users holding exactly `level`.
pub async fn find_by_access_level<C>(db: &C, level: AccessLevel) -> Result<Vec<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::AccessLevel.eq(level))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a fresh profile with the given access level and starting balance.
pub async fn create_user<C>(
    db: &C,
    user_id: &str,
    access_level: AccessLevel,
    starting_dotma_coin: i64,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let model = user::ActiveModel {
        id: Set(user_id.to_string()),
        access_level: Set(access_level),
        date_registered: Set(chrono::Utc::now()),
        dotma_coin: Set(starting_dotma_coin),
        brad_coin: Set(0),
        experience: Set(0),
        level: Set(1),
        title: Set(user::DEFAULT_TITLE.to_string()),
    };
    Ok(model.insert(db).await?)
}

/// Changes the access level of an existing user. Returns false if no record
/// matched.
pub async fn set_access_level<C>(db: &C, user_id: &str, level: AccessLevel) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = User::update_many()
        .col_expr(user::Column::AccessLevel, Expr::value(level))
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Atomically takes `amount` DotmaCoins from a wallet.
///
/// The balance check and the subtraction happen in one `UPDATE`, so two
/// concurrent spends can never overdraw the wallet. Returns false when the
/// user does not exist or cannot afford it.
pub async fn debit_dotma_coin<C>(db: &C, user_id: &str, amount: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = User::update_many()
        .col_expr(
            user::Column::DotmaCoin,
            Expr::col(user::Column::DotmaCoin).sub(amount),
        )
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::DotmaCoin.gte(amount))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Adds `amount` DotmaCoins to a wallet. Returns false if no record matched.
pub async fn credit_dotma_coin<C>(db: &C, user_id: &str, amount: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = User::update_many()
        .col_expr(
            user::Column::DotmaCoin,
            Expr::col(user::Column::DotmaCoin).add(amount),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
