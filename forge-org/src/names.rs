//! Account name policy
//!
//! Static rules every account name (user or organization) must satisfy
//! before it may enter the shared namespace. Whether the name is already
//! taken is a storage question and is answered by the store's registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a name was rejected by the [`NamePolicy`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NameReason {
    /// Name is empty or whitespace
    Empty,

    /// Name is on the reserved list or matches a reserved pattern
    Reserved,

    /// Name contains characters outside `[A-Za-z0-9_.-]`
    InvalidCharacters,

    /// Name is longer than the configured maximum
    TooLong,
}

impl NameReason {
    /// Get string representation of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Reserved => "reserved",
            Self::InvalidCharacters => "invalid characters",
            Self::TooLong => "too long",
        }
    }
}

impl fmt::Display for NameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name was rejected by the [`NamePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("name is not allowed [name: {name}, reason: {reason}]")]
pub struct NameNotAllowed {
    /// The rejected name, as given
    pub name: String,

    /// Why it was rejected
    pub reason: NameReason,

    /// The reserved pattern it matched, if any
    pub pattern: Option<String>,
}

impl NameNotAllowed {
    fn new(name: &str, reason: NameReason) -> Self {
        Self {
            name: name.to_string(),
            reason,
            pattern: None,
        }
    }

    /// The value to show next to the form field: the pattern when one
    /// matched, the name otherwise.
    pub fn value(&self) -> &str {
        self.pattern.as_deref().unwrap_or(&self.name)
    }
}

/// Reserved names and patterns for the account namespace.
///
/// Patterns are either `*suffix` or `prefix*`.
///
/// # Examples
///
/// ```
/// use forge_org::{NamePolicy, NameReason};
///
/// let policy = NamePolicy::default();
/// assert!(policy.check("acme").is_ok());
///
/// let err = policy.check("-").unwrap_err();
/// assert_eq!(err.reason, NameReason::Reserved);
///
/// let err = policy.check("alice.keys").unwrap_err();
/// assert_eq!(err.pattern.as_deref(), Some("*.keys"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamePolicy {
    /// Names no account may take (compared lowercased)
    pub reserved_names: Vec<String>,

    /// Patterns no account name may match
    pub reserved_patterns: Vec<String>,

    /// Maximum name length in characters
    pub max_length: usize,
}

impl Default for NamePolicy {
    fn default() -> Self {
        let reserved_names = [
            ".", "..", "-", "admin", "api", "assets", "avatar", "commits", "create", "css",
            "debug", "explore", "help", "img", "install", "issues", "js", "less", "new", "org",
            "plugins", "pulls", "raw", "repo", "stars", "template", "user",
        ];

        Self {
            reserved_names: reserved_names.iter().map(|s| s.to_string()).collect(),
            reserved_patterns: vec!["*.keys".to_string()],
            max_length: 35,
        }
    }
}

impl NamePolicy {
    /// Check a candidate name against the policy.
    ///
    /// Reserved names and patterns are compared against the trimmed,
    /// lowercased name.
    pub fn check(&self, name: &str) -> Result<(), NameNotAllowed> {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() {
            return Err(NameNotAllowed::new(name, NameReason::Empty));
        }

        if self.reserved_names.iter().any(|r| r.to_lowercase() == lower) {
            return Err(NameNotAllowed::new(name, NameReason::Reserved));
        }

        if let Some(pattern) = self
            .reserved_patterns
            .iter()
            .find(|p| Self::pattern_matches(&p.to_lowercase(), &lower))
        {
            return Err(NameNotAllowed {
                pattern: Some(pattern.clone()),
                ..NameNotAllowed::new(name, NameReason::Reserved)
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(NameNotAllowed::new(name, NameReason::InvalidCharacters));
        }

        if name.chars().count() > self.max_length {
            return Err(NameNotAllowed::new(name, NameReason::TooLong));
        }

        Ok(())
    }

    fn pattern_matches(pattern: &str, name: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix('*') {
            name.ends_with(suffix)
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            name.starts_with(prefix)
        } else {
            pattern == name
        }
    }
}
