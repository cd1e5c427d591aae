//! Soft reservations for one trip.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use common::{SeatId, SessionId};
use serde::{Deserialize, Serialize};

use crate::expiry::ExpiryPolicy;

/// A time-bounded, session-scoped reservation of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    pub seat_id: SeatId,
    pub session_id: SessionId,
    pub expires_at: DateTime<Utc>,
}

/// Bookkeeping of holds, at most one per seat.
///
/// Expired entries are not removed eagerly. They stay in the map until they
/// are overwritten, removed, or purged, and every read filters them out
/// through the [`ExpiryPolicy`].
///
/// The ledger does not validate ownership on `put`; `SeatInventory` checks
/// conflicts before writing.
#[derive(Debug, Clone, Default)]
pub struct HoldLedger {
    holds: HashMap<SeatId, Hold>,
    policy: ExpiryPolicy,
}

impl HoldLedger {
    pub fn new(policy: ExpiryPolicy) -> Self {
        Self {
            holds: HashMap::new(),
            policy,
        }
    }

    /// Holds that are still in force at `now`.
    pub fn active_holds(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Hold> {
        self.holds
            .values()
            .filter(move |hold| !self.policy.is_expired(hold, now))
    }

    /// The unexpired hold on `seat_id`, if any.
    pub fn active_hold(&self, seat_id: &SeatId, now: DateTime<Utc>) -> Option<&Hold> {
        self.holds
            .get(seat_id)
            .filter(|hold| !self.policy.is_expired(hold, now))
    }

    /// The hold physically recorded on `seat_id`, expired or not.
    pub fn recorded_hold(&self, seat_id: &SeatId) -> Option<&Hold> {
        self.holds.get(seat_id)
    }

    /// Inserts or refreshes the hold on `seat_id` for `session_id`.
    ///
    /// Returns the new expiry.
    pub fn put(
        &mut self,
        seat_id: SeatId,
        session_id: SessionId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> DateTime<Utc> {
        let expires_at = now + ttl;
        self.holds.insert(
            seat_id.clone(),
            Hold {
                seat_id,
                session_id,
                expires_at,
            },
        );
        expires_at
    }

    /// Removes every hold owned by `session_id`, expired or not.
    pub fn remove_by_session(&mut self, session_id: &SessionId) -> usize {
        let before = self.holds.len();
        self.holds.retain(|_, hold| &hold.session_id != session_id);
        before - self.holds.len()
    }

    /// Removes holds on the given seats regardless of owner.
    pub fn remove_by_seats<'a>(&mut self, seat_ids: impl IntoIterator<Item = &'a SeatId>) {
        for seat_id in seat_ids {
            self.holds.remove(seat_id);
        }
    }

    /// Drops expired entries. Reads never depend on this having run.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.holds.len();
        let policy = self.policy;
        self.holds.retain(|_, hold| !policy.is_expired(hold, now));
        before - self.holds.len()
    }

    /// Number of entries physically stored, including expired ones.
    #[cfg(test)]
    fn recorded_len(&self) -> usize {
        self.holds.len()
    }

    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(s: &str) -> SeatId {
        SeatId::from(s)
    }

    fn session(s: &str) -> SessionId {
        SessionId::from(s)
    }

    #[test]
    fn test_put_and_active_holds() {
        let mut ledger = HoldLedger::default();
        let now = Utc::now();

        ledger.put(seat("A1"), session("s1"), now, Duration::seconds(60));
        ledger.put(seat("A2"), session("s2"), now, Duration::seconds(60));

        assert_eq!(ledger.active_holds(now).count(), 2);
        assert_eq!(
            ledger.active_hold(&seat("A1"), now).map(|h| &h.session_id),
            Some(&session("s1"))
        );
    }

    #[test]
    fn test_put_refreshes_expiry() {
        let mut ledger = HoldLedger::default();
        let now = Utc::now();

        ledger.put(seat("A1"), session("s1"), now, Duration::seconds(60));
        let later = now + Duration::seconds(50);
        let expires_at = ledger.put(seat("A1"), session("s1"), later, Duration::seconds(60));

        assert_eq!(expires_at, later + Duration::seconds(60));
        assert_eq!(ledger.recorded_len(), 1);
        assert!(ledger
            .active_hold(&seat("A1"), now + Duration::seconds(100))
            .is_some());
    }

    #[test]
    fn test_expired_holds_are_absent_but_recorded() {
        let mut ledger = HoldLedger::default();
        let now = Utc::now();
        ledger.put(seat("A1"), session("s1"), now, Duration::seconds(60));

        let later = now + Duration::seconds(61);
        assert_eq!(ledger.active_holds(later).count(), 0);
        assert!(ledger.active_hold(&seat("A1"), later).is_none());
        assert!(ledger.recorded_hold(&seat("A1")).is_some());

        assert_eq!(ledger.purge_expired(later), 1);
        assert_eq!(ledger.recorded_len(), 0);
    }

    #[test]
    fn test_remove_by_session_leaves_other_sessions() {
        let mut ledger = HoldLedger::default();
        let now = Utc::now();
        ledger.put(seat("A1"), session("s1"), now, Duration::seconds(60));
        ledger.put(seat("A2"), session("s1"), now, Duration::seconds(60));
        ledger.put(seat("A3"), session("s2"), now, Duration::seconds(60));

        assert_eq!(ledger.remove_by_session(&session("s1")), 2);
        assert_eq!(ledger.remove_by_session(&session("s1")), 0);
        assert_eq!(ledger.active_holds(now).count(), 1);
    }

    #[test]
    fn test_remove_by_seats_ignores_owner() {
        let mut ledger = HoldLedger::default();
        let now = Utc::now();
        ledger.put(seat("A1"), session("s1"), now, Duration::seconds(60));
        ledger.put(seat("A2"), session("s2"), now, Duration::seconds(60));

        ledger.remove_by_seats([&seat("A1"), &seat("A2"), &seat("A9")]);

        assert_eq!(ledger.recorded_len(), 0);
    }
}
