//! Individual account store
//!
//! Only the slice organizations depend on: creating an individual account
//! through the shared namespace and looking it up again.

use forge_org::{Account, Clock, NamePolicy, SystemClock, UNLIMITED_REPO_CREATION};
use sea_orm::{ActiveValue::Set, DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::entities::user::{self, AccountKind};
use crate::error::{OrgError, OrgResult};
use crate::namespace::{NameError, NameRegistry};
use crate::organizations::find_individual;

/// Individual account store.
#[derive(Debug, Clone)]
pub struct Users {
    db: DatabaseConnection,
    names: NameRegistry,
    clock: Arc<dyn Clock>,
}

impl Users {
    /// Create a store with the default name policy and the system clock.
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            names: NameRegistry::new(Arc::new(NamePolicy::default())),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a custom name policy.
    pub fn with_policy(mut self, policy: NamePolicy) -> Self {
        self.names = NameRegistry::new(Arc::new(policy));
        self
    }

    /// Use a custom time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create an individual account.
    ///
    /// # Errors
    ///
    /// - [`OrgError::NameNotAllowed`] for empty, reserved or malformed names
    /// - [`OrgError::UserAlreadyExist`] when a user or organization has the name
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, email: &str) -> OrgResult<Account> {
        let txn = self.db.begin().await?;

        let now = self.clock.now();
        let account = self
            .names
            .claim(
                &txn,
                name,
                user::ActiveModel {
                    kind: Set(AccountKind::Individual),
                    full_name: Set(String::new()),
                    lower_full_name: Set(String::new()),
                    email: Set(email.to_string()),
                    location: Set(String::new()),
                    website: Set(String::new()),
                    description: Set(String::new()),
                    max_repo_creation: Set(UNLIMITED_REPO_CREATION),
                    num_teams: Set(0),
                    num_members: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| match e {
                NameError::NotAllowed(e) => OrgError::NameNotAllowed(e),
                NameError::AlreadyExists { name } => OrgError::UserAlreadyExist { name },
                NameError::Database(e) => OrgError::Database(e),
            })?;

        txn.commit().await?;

        info!(user_id = account.id, name = %account.name, "User created");
        Ok(account.into())
    }

    /// Get an individual account by id.
    pub async fn get_by_id(&self, id: i64) -> OrgResult<Account> {
        find_individual(&self.db, id).await.map(Account::from)
    }
}
