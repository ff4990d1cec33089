//! Account entity shared by individual users and organizations

use forge_org::{Account, AccountType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account discriminator column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountKind {
    /// Ordinary user
    #[sea_orm(string_value = "individual")]
    Individual,

    /// Organization account
    #[sea_orm(string_value = "organization")]
    Organization,
}

impl From<AccountKind> for AccountType {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Individual => AccountType::Individual,
            AccountKind::Organization => AccountType::Organization,
        }
    }
}

impl From<AccountType> for AccountKind {
    fn from(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Individual => AccountKind::Individual,
            AccountType::Organization => AccountKind::Organization,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Account ID (primary key, creation order)
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Name as typed by the creator
    pub name: String,

    /// Lowercased name (unique across every account kind)
    #[sea_orm(unique)]
    pub lower_name: String,

    /// Individual or organization
    pub kind: AccountKind,

    pub full_name: String,

    /// Lowercased full name, matched by search
    pub lower_full_name: String,

    pub email: String,
    pub location: String,
    pub website: String,
    pub description: String,

    /// Repository quota, -1 for unlimited
    pub max_repo_creation: i32,

    /// Number of teams (organizations only)
    pub num_teams: i32,

    /// Number of members (organizations only)
    pub num_members: i32,

    /// When the account was created
    pub created_at: ChronoDateTimeUtc,

    /// When the account was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Organization owns teams
    #[sea_orm(has_many = "super::team::Entity")]
    Teams,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Account {
            id: model.id,
            name: model.name,
            lower_name: model.lower_name,
            account_type: model.kind.into(),
            full_name: model.full_name,
            email: model.email,
            location: model.location,
            website: model.website,
            description: model.description,
            max_repo_creation: model.max_repo_creation,
            num_teams: model.num_teams,
            num_members: model.num_members,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
