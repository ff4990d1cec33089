//! Options for creating and querying organizations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Optional profile fields for a new organization.
///
/// Fields left as `None` are stored empty; `max_repo_creation` defaults to
/// unlimited (`-1`).
///
/// # Examples
///
/// ```
/// use forge_org::CreateOrganizationOptions;
///
/// let opts = CreateOrganizationOptions::default()
///     .with_full_name("Acme Corp")
///     .with_description("A popcorn company");
/// assert_eq!(opts.full_name.as_deref(), Some("Acme Corp"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrganizationOptions {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,

    /// Repository quota override
    pub max_repo_creation: Option<i32>,
}

impl CreateOrganizationOptions {
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_repo_creation(mut self, max: i32) -> Self {
        self.max_repo_creation = Some(max);
        self
    }
}

const MAX_SQL_ROWS: u64 = i64::MAX as u64;

/// 1-indexed page selection.
///
/// A `page_size` of zero disables pagination and selects every row. Page
/// zero is treated as the first page.
///
/// # Examples
///
/// ```
/// use forge_org::Pagination;
///
/// assert_eq!(Pagination::new(3, 10).offset_limit(), Some((20, 10)));
/// assert_eq!(Pagination::all().offset_limit(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// Select every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Offset and limit for this page, or `None` when unpaginated.
    ///
    /// Both values are capped at `i64::MAX`, the largest a SQL `LIMIT` or
    /// `OFFSET` can bind; a page that far out is simply empty.
    pub fn offset_limit(&self) -> Option<(u64, u64)> {
        if self.page_size == 0 {
            return None;
        }
        let page = self.page.max(1);
        let offset = (page - 1).saturating_mul(self.page_size).min(MAX_SQL_ROWS);
        Some((offset, self.page_size.min(MAX_SQL_ROWS)))
    }
}

/// Sort orders accepted by organization queries.
///
/// Only these keys are accepted; there is no way to pass a raw sort
/// expression through to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgOrder {
    /// Ascending id, which is creation order
    #[default]
    IdAsc,
    IdDesc,
    /// Lowercased name A to Z
    NameAsc,
    NameDesc,
    /// Most recently created first
    Newest,
    Oldest,
    RecentlyUpdated,
    LeastUpdated,
}

impl OrgOrder {
    /// Get the canonical key of this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdAsc => "id",
            Self::IdDesc => "id desc",
            Self::NameAsc => "alphabetically",
            Self::NameDesc => "reversealphabetically",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::RecentlyUpdated => "recentupdate",
            Self::LeastUpdated => "leastupdate",
        }
    }
}

impl fmt::Display for OrgOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unknown sort key was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order: {0}")]
pub struct ParseOrderError(pub String);

impl FromStr for OrgOrder {
    type Err = ParseOrderError;

    /// Parse a sort key (case-insensitive, surrounding whitespace ignored).
    ///
    /// ```
    /// use forge_org::OrgOrder;
    ///
    /// assert_eq!("id DESC".parse::<OrgOrder>(), Ok(OrgOrder::IdDesc));
    /// assert_eq!("newest".parse::<OrgOrder>(), Ok(OrgOrder::Newest));
    /// assert!("id; DROP TABLE users".parse::<OrgOrder>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match key.as_str() {
            "" | "id" | "id asc" => Ok(Self::IdAsc),
            "id desc" => Ok(Self::IdDesc),
            "alphabetically" | "name" | "name asc" => Ok(Self::NameAsc),
            "reversealphabetically" | "name desc" => Ok(Self::NameDesc),
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "recentupdate" => Ok(Self::RecentlyUpdated),
            "leastupdate" => Ok(Self::LeastUpdated),
            _ => Err(ParseOrderError(s.to_string())),
        }
    }
}

/// Filters for listing organizations.
///
/// With neither `member_id` nor `owner_id` set every organization matches.
/// When a member or owner filter is set and `include_private_members` is
/// false, only public memberships count.
///
/// # Examples
///
/// ```
/// use forge_org::ListOrganizationsOptions;
///
/// let opts = ListOrganizationsOptions::default()
///     .member(7)
///     .include_private()
///     .page(2, 20);
/// assert_eq!(opts.member_id, Some(7));
/// assert!(opts.include_private_members);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOrganizationsOptions {
    /// Only organizations this user is a member of
    pub member_id: Option<i64>,

    /// Only organizations this user owns
    pub owner_id: Option<i64>,

    /// Whether private memberships satisfy the member/owner filters
    pub include_private_members: bool,

    pub pagination: Pagination,

    pub order: OrgOrder,
}

impl ListOrganizationsOptions {
    pub fn member(mut self, user_id: i64) -> Self {
        self.member_id = Some(user_id);
        self
    }

    pub fn owner(mut self, user_id: i64) -> Self {
        self.owner_id = Some(user_id);
        self
    }

    pub fn include_private(mut self) -> Self {
        self.include_private_members = true;
        self
    }

    pub fn page(mut self, page: u64, page_size: u64) -> Self {
        self.pagination = Pagination::new(page, page_size);
        self
    }

    pub fn order_by(mut self, order: OrgOrder) -> Self {
        self.order = order;
        self
    }
}
