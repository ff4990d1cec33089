//! Time source for stamping account timestamps

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Source of the current time.
///
/// Stores take a `Clock` so tests can pin `created_at`/`updated_at`.
pub trait Clock: Debug + Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use forge_org::{Clock, FixedClock};
///
/// let at = Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap();
/// assert_eq!(FixedClock::new(at).now(), at);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
