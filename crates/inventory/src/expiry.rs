//! Hold expiry rules.

use chrono::{DateTime, Duration, Utc};

use crate::ledger::Hold;

/// Decides whether a hold is still in force.
///
/// Stateless: the current time is always passed in, read from the
/// inventory's injected clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    max_ttl: Duration,
}

impl ExpiryPolicy {
    /// Default upper bound on a single hold.
    pub const DEFAULT_MAX_TTL_SECONDS: i64 = 30 * 60;

    pub fn new(max_ttl: Duration) -> Self {
        Self { max_ttl }
    }

    /// A hold is expired from its `expires_at` instant onward.
    pub fn is_expired(&self, hold: &Hold, now: DateTime<Utc>) -> bool {
        now >= hold.expires_at
    }

    /// Caps a requested TTL at the policy maximum.
    pub fn clamp_ttl(&self, requested: Duration) -> Duration {
        requested.min(self.max_ttl)
    }

    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(Duration::seconds(Self::DEFAULT_MAX_TTL_SECONDS))
    }
}
