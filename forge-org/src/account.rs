//! Account domain models
//!
//! Individual users and organizations live in a single account namespace.
//! An [`Account`] carries a [`AccountType`] discriminator, and an
//! [`Organization`] is an account whose discriminator says so.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Quota value meaning "no limit on repository creation".
pub const UNLIMITED_REPO_CREATION: i32 = -1;

/// Discriminator for the shared account namespace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// An ordinary user
    Individual,

    /// A group account owning teams and memberships
    Organization,
}

impl AccountType {
    /// Get string representation of the account type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entity in the shared account namespace.
///
/// Names are unique across individuals and organizations, compared
/// case-insensitively through `lower_name`.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use forge_org::{Account, AccountType};
///
/// let alice = Account::new(1, "Alice", AccountType::Individual, Utc::now());
/// assert_eq!(alice.lower_name, "alice");
/// assert!(!alice.is_organization());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique, immutable identifier; ascending ids follow creation order
    pub id: i64,

    /// Name as typed by the creator
    pub name: String,

    /// Lowercased name, the key of the shared namespace
    pub lower_name: String,

    /// Individual or organization
    pub account_type: AccountType,

    /// Display name
    pub full_name: String,

    /// Contact email
    pub email: String,

    /// Free-form location
    pub location: String,

    /// Website URL
    pub website: String,

    /// Free-form description
    pub description: String,

    /// Maximum number of repositories, `-1` for unlimited
    pub max_repo_creation: i32,

    /// Number of teams (organizations only)
    pub num_teams: i32,

    /// Number of members (organizations only)
    pub num_members: i32,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an account with empty profile fields and zeroed counters.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        account_type: AccountType,
        now: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        Self {
            id,
            lower_name: name.to_lowercase(),
            name,
            account_type,
            full_name: String::new(),
            email: String::new(),
            location: String::new(),
            website: String::new(),
            description: String::new(),
            max_repo_creation: UNLIMITED_REPO_CREATION,
            num_teams: 0,
            num_members: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this account is an organization.
    pub fn is_organization(&self) -> bool {
        self.account_type == AccountType::Organization
    }

    /// Name to show in listings: the full name when set, the name otherwise.
    pub fn display_name(&self) -> &str {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            &self.name
        } else {
            full_name
        }
    }

    /// Whether repository creation is unrestricted for this account.
    pub fn has_unlimited_repo_creation(&self) -> bool {
        self.max_repo_creation <= UNLIMITED_REPO_CREATION
    }
}

/// An account whose type is [`AccountType::Organization`].
///
/// Only obtainable through [`TryFrom<Account>`], so holding an
/// `Organization` guarantees the discriminator. Derefs to [`Account`].
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use forge_org::{Account, AccountType, Organization};
///
/// let acme = Account::new(7, "acme", AccountType::Organization, Utc::now());
/// let org = Organization::try_from(acme).unwrap();
/// assert_eq!(org.name, "acme");
///
/// let alice = Account::new(1, "alice", AccountType::Individual, Utc::now());
/// assert!(Organization::try_from(alice).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Organization(Account);

impl Organization {
    /// Get the underlying account.
    pub fn as_account(&self) -> &Account {
        &self.0
    }

    /// Unwrap into the underlying account.
    pub fn into_account(self) -> Account {
        self.0
    }
}

impl TryFrom<Account> for Organization {
    /// The account is handed back when it is not an organization.
    type Error = Account;

    fn try_from(account: Account) -> Result<Self, Self::Error> {
        if account.is_organization() {
            Ok(Self(account))
        } else {
            Err(account)
        }
    }
}

impl Deref for Organization {
    type Target = Account;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Organization> for Account {
    fn from(org: Organization) -> Self {
        org.0
    }
}
