//! Team and membership manager
//!
//! Adds and removes organization members and flips membership visibility.
//! Every change to membership rows updates the organization's counters in
//! the same transaction.

use chrono::{DateTime, Utc};
use forge_org::{OrgMembership, Team, TeamMembership, OWNER_TEAM_NAME};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::entities::{org_user, team, team_user, user};
use crate::error::{OrgError, OrgResult};
use crate::organizations::{find_individual, find_org, lock_org, Organizations};

impl Organizations {
    /// Add `user_id` to the organization as a private, non-owner member.
    ///
    /// Adding an existing member is a no-op and leaves the organization
    /// untouched. The membership row and the `num_members` increment commit
    /// together.
    #[instrument(skip(self))]
    pub async fn add_member(&self, org_id: i64, user_id: i64) -> OrgResult<()> {
        let txn = self.db.begin().await?;

        lock_org(&txn, org_id, self.clock.now()).await?;
        find_individual(&txn, user_id).await?;

        let inserted = org_user::Entity::insert(org_user::ActiveModel {
            uid: Set(user_id),
            org_id: Set(org_id),
            is_public: Set(false),
            is_owner: Set(false),
            num_teams: Set(0),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([org_user::Column::Uid, org_user::Column::OrgId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        if inserted == 0 {
            debug!("Already a member");
            return Ok(());
        }

        adjust_num_members(&txn, org_id, 1, self.clock.now()).await?;
        txn.commit().await?;

        info!(org_id, user_id, "Member added");
        Ok(())
    }

    /// Set whether a membership is shown on the organization's public profile.
    ///
    /// # Errors
    ///
    /// [`OrgError::MembershipNotExist`] when `user_id` is not a member.
    #[instrument(skip(self))]
    pub async fn set_member_visibility(
        &self,
        org_id: i64,
        user_id: i64,
        is_public: bool,
    ) -> OrgResult<()> {
        let updated = org_user::Entity::update_many()
            .col_expr(org_user::Column::IsPublic, Expr::value(is_public))
            .filter(org_user::Column::OrgId.eq(org_id))
            .filter(org_user::Column::Uid.eq(user_id))
            .exec(&self.db)
            .await?
            .rows_affected;

        if updated == 0 {
            return Err(OrgError::MembershipNotExist { org_id, user_id });
        }

        debug!("Membership visibility updated");
        Ok(())
    }

    /// Remove `user_id` from the organization and from all of its teams.
    ///
    /// Removing a non-member is a no-op.
    ///
    /// # Errors
    ///
    /// [`OrgError::LastOwner`] when the user is the only remaining owner.
    #[instrument(skip(self))]
    pub async fn remove_member(&self, org_id: i64, user_id: i64) -> OrgResult<()> {
        let txn = self.db.begin().await?;

        lock_org(&txn, org_id, self.clock.now()).await?;

        let Some(membership) = find_membership(&txn, org_id, user_id).await? else {
            debug!("Not a member");
            return Ok(());
        };

        if membership.is_owner {
            let owners = org_user::Entity::find()
                .filter(org_user::Column::OrgId.eq(org_id))
                .filter(org_user::Column::IsOwner.eq(true))
                .count(&txn)
                .await?;
            if owners <= 1 {
                return Err(OrgError::LastOwner { org_id, user_id });
            }
        }

        let team_ids: Vec<i64> = team_user::Entity::find()
            .filter(team_user::Column::OrgId.eq(org_id))
            .filter(team_user::Column::Uid.eq(user_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| m.team_id)
            .collect();

        if !team_ids.is_empty() {
            team_user::Entity::delete_many()
                .filter(team_user::Column::OrgId.eq(org_id))
                .filter(team_user::Column::Uid.eq(user_id))
                .exec(&txn)
                .await?;

            team::Entity::update_many()
                .col_expr(
                    team::Column::NumMembers,
                    Expr::col(team::Column::NumMembers).sub(1),
                )
                .filter(team::Column::Id.is_in(team_ids.iter().copied()))
                .exec(&txn)
                .await?;
        }

        org_user::Entity::delete_by_id(membership.id)
            .exec(&txn)
            .await?;
        adjust_num_members(&txn, org_id, -1, self.clock.now()).await?;

        txn.commit().await?;

        info!(org_id, user_id, teams = team_ids.len(), "Member removed");
        Ok(())
    }

    /// Get the membership of `user_id` in the organization, if any.
    pub async fn membership(&self, org_id: i64, user_id: i64) -> OrgResult<Option<OrgMembership>> {
        Ok(find_membership(&self.db, org_id, user_id)
            .await?
            .map(OrgMembership::from))
    }

    /// Check if `user_id` is a member (public or private).
    pub async fn is_member(&self, org_id: i64, user_id: i64) -> OrgResult<bool> {
        Ok(self.membership(org_id, user_id).await?.is_some())
    }

    /// Check if `user_id` is in the organization's Owners team.
    pub async fn is_owner(&self, org_id: i64, user_id: i64) -> OrgResult<bool> {
        Ok(self
            .membership(org_id, user_id)
            .await?
            .is_some_and(|m| m.is_owner))
    }

    /// Check if `user_id` is a publicly visible member.
    pub async fn is_public_member(&self, org_id: i64, user_id: i64) -> OrgResult<bool> {
        Ok(self
            .membership(org_id, user_id)
            .await?
            .is_some_and(|m| m.is_public))
    }

    /// List the team memberships `user_id` holds in the organization.
    pub async fn team_memberships(
        &self,
        org_id: i64,
        user_id: i64,
    ) -> OrgResult<Vec<TeamMembership>> {
        let rows = team_user::Entity::find()
            .filter(team_user::Column::OrgId.eq(org_id))
            .filter(team_user::Column::Uid.eq(user_id))
            .order_by_asc(team_user::Column::TeamId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(TeamMembership::from).collect())
    }

    /// List the organization's teams, Owners first.
    pub async fn teams(&self, org_id: i64) -> OrgResult<Vec<Team>> {
        find_org(&self.db, org_id).await?;

        let teams = team::Entity::find()
            .filter(team::Column::OrgId.eq(org_id))
            .order_by_asc(team::Column::Id)
            .all(&self.db)
            .await?;
        Ok(teams.into_iter().map(Team::from).collect())
    }

    /// Get the organization's Owners team.
    pub async fn owner_team(&self, org_id: i64) -> OrgResult<Team> {
        find_org(&self.db, org_id).await?;

        team::Entity::find()
            .filter(team::Column::OrgId.eq(org_id))
            .filter(team::Column::LowerName.eq(OWNER_TEAM_NAME.to_lowercase()))
            .one(&self.db)
            .await?
            .map(Team::from)
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("owners team of organization {}", org_id)).into()
            })
    }
}

async fn find_membership<C: ConnectionTrait>(
    conn: &C,
    org_id: i64,
    user_id: i64,
) -> Result<Option<org_user::Model>, DbErr> {
    org_user::Entity::find()
        .filter(org_user::Column::OrgId.eq(org_id))
        .filter(org_user::Column::Uid.eq(user_id))
        .one(conn)
        .await
}

/// Shift `num_members` by `delta` and refresh `updated_at`.
async fn adjust_num_members<C: ConnectionTrait>(
    conn: &C,
    org_id: i64,
    delta: i32,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    user::Entity::update_many()
        .col_expr(
            user::Column::NumMembers,
            Expr::col(user::Column::NumMembers).add(delta),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(now))
        .filter(user::Column::Id.eq(org_id))
        .exec(conn)
        .await?;
    Ok(())
}
