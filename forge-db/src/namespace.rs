//! Shared account namespace
//!
//! Users and organizations draw names from one namespace keyed by the
//! lowercased name. A name is claimed by inserting the account row; the
//! UNIQUE index on `users.lower_name` arbitrates when two creations race.
//!
//! The insert is the first statement of the claiming transaction, so on
//! SQLite the transaction takes the write lock before it reads anything and
//! a losing writer waits for the winner instead of failing with `SQLITE_BUSY`.

use forge_org::{AccountType, NameNotAllowed, NamePolicy};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::user;

/// Name registry error types.
#[derive(Debug, Error)]
pub enum NameError {
    /// Rejected by the static policy
    #[error(transparent)]
    NotAllowed(#[from] NameNotAllowed),

    /// An account already uses this name
    #[error("name already exists [name: {name}]")]
    AlreadyExists { name: String },

    /// Storage failure during the lookup or insert
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Gatekeeper of the shared account namespace.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    policy: Arc<NamePolicy>,
}

impl NameRegistry {
    pub fn new(policy: Arc<NamePolicy>) -> Self {
        Self { policy }
    }

    /// Get the static name policy.
    pub fn policy(&self) -> &NamePolicy {
        &self.policy
    }

    /// Check whether `name` is free for a new account.
    ///
    /// Read-only; a later [`claim`](Self::claim) can still lose a race.
    pub async fn reserve<C: ConnectionTrait>(&self, conn: &C, name: &str) -> Result<(), NameError> {
        self.policy.check(name)?;

        let existing = user::Entity::find()
            .filter(user::Column::LowerName.eq(name.to_lowercase()))
            .one(conn)
            .await?;

        match existing {
            Some(account) => {
                debug!(name, kind = %AccountType::from(account.kind), "Name already taken");
                Err(NameError::AlreadyExists {
                    name: name.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// Insert `account` under `name`, taking the name in the namespace.
    ///
    /// `name` and `lower_name` are set here. Run this before any other
    /// statement of the transaction.
    pub async fn claim<C: ConnectionTrait>(
        &self,
        conn: &C,
        name: &str,
        mut account: user::ActiveModel,
    ) -> Result<user::Model, NameError> {
        self.policy.check(name)?;

        account.name = Set(name.to_string());
        account.lower_name = Set(name.to_lowercase());

        account.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                debug!(name, "Name already taken");
                NameError::AlreadyExists {
                    name: name.to_string(),
                }
            } else {
                warn!(name, error = %e, "Failed to insert account");
                NameError::Database(e)
            }
        })
    }
}

/// Check whether a storage error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
