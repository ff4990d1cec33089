//! Team entity scoped to one organization

use forge_org::{AccessMode, Team};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access mode column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Authorize {
    #[sea_orm(string_value = "none")]
    NoAccess,

    #[sea_orm(string_value = "read")]
    Read,

    #[sea_orm(string_value = "write")]
    Write,

    #[sea_orm(string_value = "admin")]
    Admin,

    #[sea_orm(string_value = "owner")]
    Owner,
}

impl From<Authorize> for AccessMode {
    fn from(authorize: Authorize) -> Self {
        match authorize {
            Authorize::NoAccess => AccessMode::None,
            Authorize::Read => AccessMode::Read,
            Authorize::Write => AccessMode::Write,
            Authorize::Admin => AccessMode::Admin,
            Authorize::Owner => AccessMode::Owner,
        }
    }
}

impl From<AccessMode> for Authorize {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::None => Authorize::NoAccess,
            AccessMode::Read => Authorize::Read,
            AccessMode::Write => Authorize::Write,
            AccessMode::Admin => Authorize::Admin,
            AccessMode::Owner => Authorize::Owner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Team ID (primary key)
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning organization
    pub org_id: i64,

    /// Lowercased name (unique per organization)
    pub lower_name: String,

    /// Display name
    pub name: String,

    pub description: String,

    /// Access mode granted to members
    pub authorize: Authorize,

    /// Number of team members
    pub num_members: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Team belongs to an organization
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrgId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Org,

    /// Team has members
    #[sea_orm(has_many = "super::team_user::Entity")]
    Members,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Org.def()
    }
}

impl Related<super::team_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Team {
    fn from(model: Model) -> Self {
        Team {
            id: model.id,
            org_id: model.org_id,
            name: model.name,
            lower_name: model.lower_name,
            description: model.description,
            authorize: model.authorize.into(),
            num_members: model.num_members,
        }
    }
}
