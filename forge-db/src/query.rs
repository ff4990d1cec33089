//! Query engine
//!
//! Read-only listing and search over organizations. Member and owner
//! filters are `id IN (subquery)` predicates, so an organization appears at
//! most once no matter how many membership rows match.

use forge_org::{ListOrganizationsOptions, OrgOrder, Organization, Pagination};
use sea_orm::sea_query::{LikeExpr, Order, Query, SelectStatement};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use tracing::{debug, instrument};

use crate::entities::org_user;
use crate::entities::user::{self, AccountKind};
use crate::error::OrgResult;
use crate::organizations::{into_organization, Organizations};

impl Organizations {
    /// List organizations matching `opts`.
    ///
    /// A page past the end is an empty vector, not an error.
    #[instrument(skip(self))]
    pub async fn list(&self, opts: &ListOrganizationsOptions) -> OrgResult<Vec<Organization>> {
        let mut select =
            user::Entity::find().filter(user::Column::Kind.eq(AccountKind::Organization));

        if let Some(member_id) = opts.member_id {
            select = select.filter(
                user::Column::Id.in_subquery(memberships_of(
                    member_id,
                    false,
                    opts.include_private_members,
                )),
            );
        }
        if let Some(owner_id) = opts.owner_id {
            select = select.filter(
                user::Column::Id.in_subquery(memberships_of(
                    owner_id,
                    true,
                    opts.include_private_members,
                )),
            );
        }

        let rows = paginate(sort(select, opts.order), opts.pagination)
            .all(&self.db)
            .await?;

        debug!(count = rows.len(), "Listed organizations");
        rows.into_iter().map(into_organization).collect()
    }

    /// Search organizations whose name or full name contains `query`,
    /// ignoring case.
    ///
    /// Returns the requested page and the number of matches before paging.
    /// LIKE wildcards in `query` match themselves. Case folding is Unicode
    /// aware: both sides are lowercased in Rust, not by the database.
    #[instrument(skip(self))]
    pub async fn search_by_name(
        &self,
        query: &str,
        pagination: Pagination,
        order: OrgOrder,
    ) -> OrgResult<(Vec<Organization>, u64)> {
        let query = query.trim();
        if query.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let select = user::Entity::find()
            .filter(user::Column::Kind.eq(AccountKind::Organization))
            .filter(
                Condition::any()
                    .add(
                        user::Column::LowerName
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        user::Column::LowerFullName
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );

        let total = select.clone().count(&self.db).await?;
        let rows = paginate(sort(select, order), pagination)
            .all(&self.db)
            .await?;

        debug!(total, count = rows.len(), "Searched organizations");
        let orgs = rows
            .into_iter()
            .map(into_organization)
            .collect::<OrgResult<Vec<_>>>()?;
        Ok((orgs, total))
    }
}

/// Ids of organizations where `user_id` holds a matching membership.
fn memberships_of(user_id: i64, owners_only: bool, include_private: bool) -> SelectStatement {
    let mut query = Query::select();
    query
        .column(org_user::Column::OrgId)
        .from(org_user::Entity)
        .and_where(org_user::Column::Uid.eq(user_id));
    if owners_only {
        query.and_where(org_user::Column::IsOwner.eq(true));
    }
    if !include_private {
        query.and_where(org_user::Column::IsPublic.eq(true));
    }
    query.to_owned()
}

/// Order by the requested key; ties fall back to id so pages stay stable.
fn sort(select: Select<user::Entity>, order: OrgOrder) -> Select<user::Entity> {
    let (column, direction) = match order {
        OrgOrder::IdAsc => return select.order_by(user::Column::Id, Order::Asc),
        OrgOrder::IdDesc => return select.order_by(user::Column::Id, Order::Desc),
        OrgOrder::NameAsc => (user::Column::LowerName, Order::Asc),
        OrgOrder::NameDesc => (user::Column::LowerName, Order::Desc),
        OrgOrder::Newest => (user::Column::CreatedAt, Order::Desc),
        OrgOrder::Oldest => (user::Column::CreatedAt, Order::Asc),
        OrgOrder::RecentlyUpdated => (user::Column::UpdatedAt, Order::Desc),
        OrgOrder::LeastUpdated => (user::Column::UpdatedAt, Order::Asc),
    };
    select
        .order_by(column, direction.clone())
        .order_by(user::Column::Id, direction)
}

fn paginate(select: Select<user::Entity>, pagination: Pagination) -> Select<user::Entity> {
    match pagination.offset_limit() {
        Some((offset, limit)) => select.offset(offset).limit(limit),
        None => select,
    }
}

/// Escape LIKE metacharacters so they match literally with `ESCAPE '\'`.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
