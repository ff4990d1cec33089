//! Team access modes
//!
//! A team grants its members one access mode over the organization's
//! resources. The Owners team always carries [`AccessMode::Owner`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization level granted by a team.
///
/// Modes are hierarchical: None < Read < Write < Admin < Owner
///
/// # Examples
///
/// ```
/// use forge_org::AccessMode;
///
/// assert!(AccessMode::Owner.is_owner());
/// assert!(AccessMode::Write > AccessMode::Read);
/// assert_eq!(AccessMode::default(), AccessMode::Read);
/// ```
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// No access
    None = 0,

    /// Read-only access
    #[default]
    Read = 1,

    /// Read and write access
    Write = 2,

    /// Can manage teams and members
    Admin = 3,

    /// Full organization control
    Owner = 4,
}

impl AccessMode {
    /// Check if this mode is organization ownership.
    pub fn is_owner(&self) -> bool {
        *self == AccessMode::Owner
    }

    /// Get string representation of the access mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
