// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identity-provider token cache entry (§3 `TokenCacheEntry`, §4.7).

use chrono::{DateTime, Duration, Utc};

/// A cached bearer token for a specific audience.
///
/// Invariant: never served when `expires_at - now < 5 minutes` (§3, §8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCacheEntry {
    /// The bearer token. Scoped to a specific audience — never substitutable
    /// across audiences.
    pub access_token: String,
    /// Absolute expiry time.
    pub expires_at: DateTime<Utc>,
}

/// Tokens within this long of expiry are treated as unusable (§4.7 step 2).
pub const MIN_REMAINING_LIFETIME: Duration = Duration::seconds(300);

impl TokenCacheEntry {
    /// Whether this entry still has at least [`MIN_REMAINING_LIFETIME`]
    /// remaining as of `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > MIN_REMAINING_LIFETIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_expiring_in(seconds: i64) -> TokenCacheEntry {
        TokenCacheEntry {
            access_token: "token".into(),
            expires_at: Utc::now() + Duration::seconds(seconds),
        }
    }

    #[test]
    fn fresh_when_well_ahead_of_expiry() {
        assert!(entry_expiring_in(3600).is_fresh(Utc::now()));
    }

    #[test]
    fn stale_when_inside_the_five_minute_margin() {
        assert!(!entry_expiring_in(299).is_fresh(Utc::now()));
    }

    #[test]
    fn stale_when_already_expired() {
        assert!(!entry_expiring_in(-10).is_fresh(Utc::now()));
    }

    #[test]
    fn boundary_at_exactly_five_minutes_is_stale() {
        // Strictly greater-than is required, so exactly 300s remaining is stale.
        assert!(!entry_expiring_in(300).is_fresh(Utc::now()));
    }
}
