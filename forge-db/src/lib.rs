//! # Forge Organization Store
//!
//! SeaORM-backed persistence for Forge organizations: the shared account
//! namespace, atomic organization creation, memberships, and queries.
//!
//! ## Overview
//!
//! - **Namespace**: [`NameRegistry`] checks names against the policy and claims them in the `users` table
//! - **Organizations**: [`Organizations`] creates, looks up, counts and deletes organizations
//! - **Memberships**: add/remove members and toggle public visibility, with counters kept in step
//! - **Queries**: filtered listing and case-insensitive search with pagination
//! - **Users**: [`Users`] creates the individual accounts organizations are built from
//!
//! ## Tables
//!
//! ```text
//! users ──< teams ──< team_users >── users
//!   └────< org_users >── users
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use forge_db::{connect, migrate, DatabaseConfig, Organizations, Users};
//! use forge_org::ListOrganizationsOptions;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = connect(&DatabaseConfig::from_env()).await?;
//! migrate(&db).await?;
//!
//! let alice = Users::new(db.clone()).create("alice", "alice@example.com").await?;
//! let orgs = Organizations::new(db);
//! let acme = orgs.create("acme", alice.id, Default::default()).await?;
//! orgs.set_member_visibility(acme.id, alice.id, true).await?;
//!
//! let public = orgs
//!     .list(&ListOrganizationsOptions::default().member(alice.id))
//!     .await?;
//! assert_eq!(public.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entities;
pub mod error;
pub mod members;
pub mod migrator;
pub mod namespace;
pub mod organizations;
pub mod query;
pub mod users;

pub use config::{ConfigError, DatabaseConfig};
pub use error::{OrgError, OrgLookup, OrgResult};
pub use migrator::Migrator;
pub use namespace::{NameError, NameRegistry};
pub use organizations::Organizations;
pub use users::Users;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// Open a connection pool for `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.connect_options()).await?;
    info!(max_connections = config.max_connections, "Database connected");
    Ok(db)
}

/// Apply all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}
