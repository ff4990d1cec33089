//! Membership domain models
//!
//! This module provides the join records linking accounts to organizations
//! and teams. Organization membership carries the visibility flag shown on
//! the organization's public profile.

use serde::{Deserialize, Serialize};

/// Organization membership linking a member account to an organization.
///
/// # Examples
///
/// ```
/// use forge_org::OrgMembership;
///
/// let membership = OrgMembership::new(1, 10, 20);
/// assert!(!membership.is_public);
/// assert!(!membership.is_owner);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMembership {
    /// Unique membership ID
    pub id: i64,

    /// Member account ID
    pub user_id: i64,

    /// Organization ID
    pub org_id: i64,

    /// Whether the membership is disclosed on the organization's public profile
    pub is_public: bool,

    /// Whether the member belongs to the Owners team
    pub is_owner: bool,

    /// Number of the organization's teams the member belongs to
    pub num_teams: i32,
}

impl OrgMembership {
    /// Creates a private, non-owner membership.
    pub fn new(id: i64, user_id: i64, org_id: i64) -> Self {
        Self {
            id,
            user_id,
            org_id,
            is_public: false,
            is_owner: false,
            num_teams: 0,
        }
    }

    /// Check if a viewer may see this membership.
    ///
    /// Public memberships are visible to everyone; private ones only when
    /// the viewer is allowed to see private members.
    pub fn is_visible(&self, include_private: bool) -> bool {
        self.is_public || include_private
    }
}

/// Team membership linking a member account to a team.
///
/// # Examples
///
/// ```
/// use forge_org::TeamMembership;
///
/// let membership = TeamMembership::new(1, 20, 5, 10);
/// assert_eq!(membership.team_id, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    /// Unique membership ID
    pub id: i64,

    /// Organization the team belongs to
    pub org_id: i64,

    /// Team ID
    pub team_id: i64,

    /// Member account ID
    pub user_id: i64,
}

impl TeamMembership {
    /// Creates a new team membership.
    pub fn new(id: i64, org_id: i64, team_id: i64, user_id: i64) -> Self {
        Self {
            id,
            org_id,
            team_id,
            user_id,
        }
    }
}
