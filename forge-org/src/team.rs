//! Team domain models
//!
//! Teams group member accounts inside one organization. Every organization
//! gets an "Owners" team at creation; membership in it means ownership.

use serde::{Deserialize, Serialize};

use crate::access::AccessMode;

/// Display name of the team created with every organization.
pub const OWNER_TEAM_NAME: &str = "Owners";

/// A named group of members scoped to one organization.
///
/// Team names are unique within their organization, compared
/// case-insensitively through `lower_name`.
///
/// # Examples
///
/// ```
/// use forge_org::{AccessMode, Team};
///
/// let owners = Team::owners(0, 42);
/// assert!(owners.is_owner_team());
/// assert_eq!(owners.authorize, AccessMode::Owner);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier for the team
    pub id: i64,

    /// Organization this team belongs to
    pub org_id: i64,

    /// Human-readable name
    pub name: String,

    /// Lowercased name (unique within the organization)
    pub lower_name: String,

    /// Team description
    pub description: String,

    /// Access mode granted to members
    pub authorize: AccessMode,

    /// Number of team members
    pub num_members: i32,
}

impl Team {
    /// Creates the Owners team for an organization.
    pub fn owners(id: i64, org_id: i64) -> Self {
        Self {
            id,
            org_id,
            name: OWNER_TEAM_NAME.to_string(),
            lower_name: OWNER_TEAM_NAME.to_lowercase(),
            description: String::new(),
            authorize: AccessMode::Owner,
            num_members: 0,
        }
    }

    /// Check if this is the organization's Owners team.
    pub fn is_owner_team(&self) -> bool {
        self.authorize.is_owner() && self.lower_name == OWNER_TEAM_NAME.to_lowercase()
    }
}
