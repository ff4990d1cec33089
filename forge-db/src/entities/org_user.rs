//! OrgUser entity for organization membership and visibility

use forge_org::OrgMembership;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "org_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Member account ID (unique together with org_id)
    pub uid: i64,

    /// Organization account ID
    pub org_id: i64,

    /// Shown on the organization's public profile
    pub is_public: bool,

    /// Member of the Owners team
    pub is_owner: bool,

    /// Number of the organization's teams the member is in
    pub num_teams: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Membership belongs to an organization
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrgId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Org,

    /// Membership belongs to a member account
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Uid",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Member,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OrgMembership {
    fn from(model: Model) -> Self {
        OrgMembership {
            id: model.id,
            user_id: model.uid,
            org_id: model.org_id,
            is_public: model.is_public,
            is_owner: model.is_owner,
            num_teams: model.num_teams,
        }
    }
}
