//! # Forge Organizations
//!
//! Domain model for organization accounts on Forge: organizations share one
//! name namespace with individual users, own teams, and list their members
//! with per-member visibility.
//!
//! ## Overview
//!
//! The forge-org crate handles:
//! - **Accounts**: Individuals and organizations behind one discriminator
//! - **Teams**: Named member groups with an access mode; every organization has "Owners"
//! - **Memberships**: Organization membership with a public/private flag, team membership
//! - **Names**: Reserved names and patterns for the shared namespace
//! - **Options**: Creation options, list filters, pagination and sort keys
//! - **Clock**: Injectable time source
//!
//! Persistence lives in `forge-db`.
//!
//! ## Architecture
//!
//! ```text
//! Account (Individual)
//!   ├─ OrgMembership (is_public, is_owner) ─→ Account (Organization)
//!   │                                            └─ Team ("Owners", ...)
//!   └─ TeamMembership ──────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use forge_org::{ListOrganizationsOptions, NamePolicy, OrgOrder};
//!
//! // Names are checked before they enter the namespace
//! let policy = NamePolicy::default();
//! assert!(policy.check("acme").is_ok());
//! assert!(policy.check("explore").is_err());
//!
//! // Organizations a user publicly belongs to, newest first
//! let opts = ListOrganizationsOptions::default()
//!     .member(42)
//!     .order_by(OrgOrder::Newest)
//!     .page(1, 20);
//! ```

pub mod access;
pub mod account;
pub mod clock;
pub mod membership;
pub mod names;
pub mod options;
pub mod team;

// Re-export main types for convenience
pub use access::AccessMode;
pub use account::{Account, AccountType, Organization, UNLIMITED_REPO_CREATION};
pub use clock::{Clock, FixedClock, SystemClock};
pub use membership::{OrgMembership, TeamMembership};
pub use names::{NameNotAllowed, NamePolicy, NameReason};
pub use options::{
    CreateOrganizationOptions, ListOrganizationsOptions, OrgOrder, Pagination, ParseOrderError,
};
pub use team::{Team, OWNER_TEAM_NAME};
