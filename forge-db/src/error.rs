//! Error types for organization operations
//!
//! Validation failures are typed so callers can map them to form errors or
//! not-found responses. Storage faults are carried unchanged in
//! [`OrgError::Database`]; nothing in this crate retries them.

use forge_org::NameNotAllowed;
use sea_orm::DbErr;
use std::fmt;
use thiserror::Error;

/// How a missing organization was looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgLookup {
    Name(String),
    Id(i64),
}

impl fmt::Display for OrgLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgLookup::Name(name) => write!(f, "name: {}", name),
            OrgLookup::Id(id) => write!(f, "id: {}", id),
        }
    }
}

/// Organization store error types.
#[derive(Debug, Error)]
pub enum OrgError {
    /// Name is empty, reserved or malformed
    #[error(transparent)]
    NameNotAllowed(#[from] NameNotAllowed),

    /// Another account (user or organization) already has this name
    #[error("organization already exists [name: {name}]")]
    OrganizationAlreadyExist { name: String },

    /// Another account (user or organization) already has this name
    #[error("user already exists [name: {name}]")]
    UserAlreadyExist { name: String },

    /// No organization with this name or id
    #[error("organization does not exist [{0}]")]
    OrganizationNotExist(OrgLookup),

    /// No individual user with this id
    #[error("user does not exist [id: {id}]")]
    UserNotExist { id: i64 },

    /// The user is not a member of the organization
    #[error("membership does not exist [org_id: {org_id}, user_id: {user_id}]")]
    MembershipNotExist { org_id: i64, user_id: i64 },

    /// Removing this member would leave the Owners team empty
    #[error("cannot remove the last owner [org_id: {org_id}, user_id: {user_id}]")]
    LastOwner { org_id: i64, user_id: i64 },

    /// Underlying storage failure
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Result type for organization operations.
pub type OrgResult<T> = Result<T, OrgError>;

impl OrgError {
    /// Check if this error is an unexpected storage fault rather than a
    /// validation outcome.
    pub fn is_server_error(&self) -> bool {
        matches!(self, OrgError::Database(_))
    }

    /// Check if this error means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            OrgError::OrganizationNotExist(_)
                | OrgError::UserNotExist { .. }
                | OrgError::MembershipNotExist { .. }
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OrgError::NameNotAllowed(_) => 422,

            OrgError::OrganizationAlreadyExist { .. }
            | OrgError::UserAlreadyExist { .. }
            | OrgError::LastOwner { .. } => 409,

            OrgError::OrganizationNotExist(_)
            | OrgError::UserNotExist { .. }
            | OrgError::MembershipNotExist { .. } => 404,

            OrgError::Database(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            OrgError::NameNotAllowed(_) => "NAME_NOT_ALLOWED",
            OrgError::OrganizationAlreadyExist { .. } => "ORGANIZATION_ALREADY_EXISTS",
            OrgError::UserAlreadyExist { .. } => "USER_ALREADY_EXISTS",
            OrgError::OrganizationNotExist(_) => "ORGANIZATION_NOT_FOUND",
            OrgError::UserNotExist { .. } => "USER_NOT_FOUND",
            OrgError::MembershipNotExist { .. } => "MEMBERSHIP_NOT_FOUND",
            OrgError::LastOwner { .. } => "LAST_OWNER",
            OrgError::Database(_) => "INTERNAL_ERROR",
        }
    }
}
