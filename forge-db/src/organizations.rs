//! Organization record store
//!
//! Creation, lookup, counting and deletion of organization accounts. A new
//! organization is written together with its Owners team and the creator's
//! memberships in one transaction.

use chrono::{DateTime, Utc};
use forge_org::{
    AccessMode, Account, Clock, CreateOrganizationOptions, NamePolicy, Organization, SystemClock,
    OWNER_TEAM_NAME, UNLIMITED_REPO_CREATION,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::entities::user::AccountKind;
use crate::entities::{org_user, team, team_user, user};
use crate::error::{OrgError, OrgLookup, OrgResult};
use crate::namespace::{NameError, NameRegistry};

/// Organization store backed by a SeaORM connection.
///
/// Cheap to clone; clones share the connection pool, the name policy and
/// the clock.
///
/// # Examples
///
/// ```rust,no_run
/// use forge_db::{connect, migrate, DatabaseConfig, Organizations, Users};
/// use forge_org::CreateOrganizationOptions;
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let db = connect(&DatabaseConfig::in_memory()).await?;
///     migrate(&db).await?;
///
///     let alice = Users::new(db.clone()).create("alice", "alice@example.com").await?;
///     let orgs = Organizations::new(db);
///     let acme = orgs
///         .create("acme", alice.id, CreateOrganizationOptions::default())
///         .await?;
///     assert_eq!(acme.num_members, 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Organizations {
    pub(crate) db: DatabaseConnection,
    pub(crate) names: NameRegistry,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Organizations {
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

    /// Get the underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create an organization owned by `owner_id`.
    ///
    /// In one transaction this:
    /// - claims the name by inserting the organization with `num_teams = 1`,
    ///   `num_members = 1`
    /// - checks the owner is an existing individual account
    /// - creates the Owners team and the owner's team and org memberships
    ///
    /// Any failure, or dropping the returned future, rolls back every row.
    ///
    /// # Errors
    ///
    /// - [`OrgError::NameNotAllowed`] for empty, reserved or malformed names
    /// - [`OrgError::OrganizationAlreadyExist`] when a user or organization has the name
    /// - [`OrgError::UserNotExist`] when the owner is not an individual account
    #[instrument(skip(self, opts))]
    pub async fn create(
        &self,
        name: &str,
        owner_id: i64,
        opts: CreateOrganizationOptions,
    ) -> OrgResult<Organization> {
        let txn = self.db.begin().await?;

        let now = self.clock.now();
        let full_name = opts.full_name.unwrap_or_default();
        let org = self
            .names
            .claim(
                &txn,
                name,
                user::ActiveModel {
                    kind: Set(AccountKind::Organization),
                    lower_full_name: Set(full_name.to_lowercase()),
                    full_name: Set(full_name),
                    email: Set(opts.email.unwrap_or_default()),
                    location: Set(opts.location.unwrap_or_default()),
                    website: Set(opts.website.unwrap_or_default()),
                    description: Set(opts.description.unwrap_or_default()),
                    max_repo_creation: Set(opts
                        .max_repo_creation
                        .unwrap_or(UNLIMITED_REPO_CREATION)),
                    num_teams: Set(1),
                    num_members: Set(1),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| match e {
                NameError::NotAllowed(e) => OrgError::NameNotAllowed(e),
                NameError::AlreadyExists { name } => OrgError::OrganizationAlreadyExist { name },
                NameError::Database(e) => OrgError::Database(e),
            })?;

        find_individual(&txn, owner_id).await?;

        let owners = team::ActiveModel {
            org_id: Set(org.id),
            lower_name: Set(OWNER_TEAM_NAME.to_lowercase()),
            name: Set(OWNER_TEAM_NAME.to_string()),
            description: Set(String::new()),
            authorize: Set(AccessMode::Owner.into()),
            num_members: Set(1),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        team_user::ActiveModel {
            org_id: Set(org.id),
            team_id: Set(owners.id),
            uid: Set(owner_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        org_user::ActiveModel {
            uid: Set(owner_id),
            org_id: Set(org.id),
            is_public: Set(false),
            is_owner: Set(true),
            num_teams: Set(1),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(org_id = org.id, name = %org.name, owner_id, "Organization created");
        into_organization(org)
    }

    /// Get an organization by name (case-insensitive).
    ///
    /// Individual accounts with the name are reported as not existing.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> OrgResult<Organization> {
        user::Entity::find()
            .filter(user::Column::LowerName.eq(name.to_lowercase()))
            .filter(user::Column::Kind.eq(AccountKind::Organization))
            .one(&self.db)
            .await?
            .ok_or_else(|| OrgError::OrganizationNotExist(OrgLookup::Name(name.to_string())))
            .and_then(into_organization)
    }

    /// Get an organization by id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> OrgResult<Organization> {
        find_org(&self.db, id).await.and_then(into_organization)
    }

    /// Count all organizations.
    pub async fn count(&self) -> OrgResult<u64> {
        let count = user::Entity::find()
            .filter(user::Column::Kind.eq(AccountKind::Organization))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Count the organizations `user_id` is a member of, public or private.
    ///
    /// Unknown users have zero organizations.
    pub async fn count_by_user(&self, user_id: i64) -> OrgResult<u64> {
        let count = org_user::Entity::find()
            .filter(org_user::Column::Uid.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Delete an organization with its teams and memberships.
    #[instrument(skip(self))]
    pub async fn delete(&self, org_id: i64) -> OrgResult<()> {
        let txn = self.db.begin().await?;

        lock_org(&txn, org_id, self.clock.now()).await?;
        let org = find_org(&txn, org_id).await?;

        let team_members = team_user::Entity::delete_many()
            .filter(team_user::Column::OrgId.eq(org_id))
            .exec(&txn)
            .await?
            .rows_affected;
        let teams = team::Entity::delete_many()
            .filter(team::Column::OrgId.eq(org_id))
            .exec(&txn)
            .await?
            .rows_affected;
        let members = org_user::Entity::delete_many()
            .filter(org_user::Column::OrgId.eq(org_id))
            .exec(&txn)
            .await?
            .rows_affected;
        user::Entity::delete_by_id(org_id).exec(&txn).await?;

        txn.commit().await?;

        debug!(teams, members, team_members, "Removed organization rows");
        info!(org_id, name = %org.name, "Organization deleted");
        Ok(())
    }
}

/// Load an organization row, rejecting missing ids and individual accounts.
pub(crate) async fn find_org<C: ConnectionTrait>(conn: &C, id: i64) -> OrgResult<user::Model> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Kind.eq(AccountKind::Organization))
        .one(conn)
        .await?
        .ok_or(OrgError::OrganizationNotExist(OrgLookup::Id(id)))
}

/// Stamp `updated_at` on an organization as the transaction's first write.
///
/// This takes the write lock (the database on SQLite, the row elsewhere)
/// before the transaction reads anything, so concurrent membership changes
/// on one organization queue up instead of failing.
pub(crate) async fn lock_org<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    now: DateTime<Utc>,
) -> OrgResult<()> {
    let touched = user::Entity::update_many()
        .col_expr(user::Column::UpdatedAt, Expr::value(now))
        .filter(user::Column::Id.eq(id))
        .filter(user::Column::Kind.eq(AccountKind::Organization))
        .exec(conn)
        .await?
        .rows_affected;

    if touched == 0 {
        return Err(OrgError::OrganizationNotExist(OrgLookup::Id(id)));
    }
    Ok(())
}

/// Load an individual account row.
pub(crate) async fn find_individual<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> OrgResult<user::Model> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Kind.eq(AccountKind::Individual))
        .one(conn)
        .await?
        .ok_or(OrgError::UserNotExist { id })
}

/// Wrap an organization row; an individual account is reported as missing.
pub(crate) fn into_organization(model: user::Model) -> OrgResult<Organization> {
    Organization::try_from(Account::from(model))
        .map_err(|account| OrgError::OrganizationNotExist(OrgLookup::Id(account.id)))
}
