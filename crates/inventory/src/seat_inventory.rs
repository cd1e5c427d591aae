//! The per-trip seat authority.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use common::{BookingId, Clock, SeatId, SessionId, TripId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InventoryError, Result};
use crate::expiry::ExpiryPolicy;
use crate::ledger::HoldLedger;
use crate::seat_map::SeatMap;

/// Live state of one seat, derived from committed seats and active holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeatState {
    Free,
    Held {
        session_id: SessionId,
        expires_at: DateTime<Utc>,
    },
    Committed {
        booking_id: BookingId,
    },
}

impl SeatState {
    /// The public label of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatState::Free => "free",
            SeatState::Held { .. } => "held",
            SeatState::Committed { .. } => "committed",
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, SeatState::Free)
    }
}

/// Receipt for a successful hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldToken {
    pub token: Uuid,
    pub trip_id: TripId,
    pub session_id: SessionId,
    pub seat_ids: Vec<SeatId>,
    pub expires_at: DateTime<Utc>,
}

/// Seat counts taken under a single lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub capacity: usize,
    pub committed: usize,
    pub held: usize,
    pub available: usize,
}

#[derive(Debug, Default)]
struct InventoryState {
    committed: HashMap<SeatId, BookingId>,
    holds: HoldLedger,
}

/// Who is asking to take a seat, used when checking eligibility.
#[derive(Clone, Copy)]
enum Claimant<'a> {
    Hold {
        session_id: &'a SessionId,
    },
    Commit {
        booking_id: BookingId,
        session_id: Option<&'a SessionId>,
    },
}

/// Authoritative seat state for one trip.
///
/// Every operation runs under the trip's single `RwLock`: mutations take the
/// write lock, reads take the read lock, and nothing inside a critical
/// section blocks on I/O. Mutations validate the full seat set before
/// writing anything, so a failed call leaves no trace.
pub struct SeatInventory {
    trip_id: TripId,
    seat_map: SeatMap,
    clock: Arc<dyn Clock>,
    state: RwLock<InventoryState>,
}

impl SeatInventory {
    /// Creates an empty inventory (every seat free) for a trip.
    pub fn new(
        trip_id: TripId,
        seat_map: SeatMap,
        policy: ExpiryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trip_id,
            seat_map,
            clock,
            state: RwLock::new(InventoryState {
                committed: HashMap::new(),
                holds: HoldLedger::new(policy),
            }),
        }
    }

    pub fn trip_id(&self) -> TripId {
        self.trip_id
    }

    pub fn seat_map(&self) -> &SeatMap {
        &self.seat_map
    }

    pub fn capacity(&self) -> usize {
        self.seat_map.capacity()
    }

    /// Live state of every seat in the layout.
    pub fn query_availability(&self) -> BTreeMap<SeatId, SeatState> {
        let now = self.clock.now();
        let state = self.read();
        self.seat_map
            .seats()
            .map(|seat_id| (seat_id.clone(), Self::state_of(&state, seat_id, now)))
            .collect()
    }

    /// Live state of a single seat.
    pub fn seat_state(&self, seat_id: &SeatId) -> Result<SeatState> {
        if !self.seat_map.is_valid_seat(seat_id) {
            return Err(InventoryError::UnknownSeat(seat_id.clone()));
        }
        let now = self.clock.now();
        Ok(Self::state_of(&self.read(), seat_id, now))
    }

    /// Capacity, committed, held and available counts.
    pub fn snapshot(&self) -> InventorySnapshot {
        let now = self.clock.now();
        let state = self.read();
        let committed = state.committed.len();
        let held = state.holds.active_holds(now).count();
        InventorySnapshot {
            capacity: self.capacity(),
            committed,
            held,
            available: self.capacity().saturating_sub(committed + held),
        }
    }

    /// Seats a session could still take: free seats plus its own holds.
    pub fn available_for(&self, session_id: Option<&SessionId>) -> usize {
        let now = self.clock.now();
        let state = self.read();
        let held_by_others = state
            .holds
            .active_holds(now)
            .filter(|hold| Some(&hold.session_id) != session_id)
            .count();
        self.capacity()
            .saturating_sub(state.committed.len() + held_by_others)
    }

    /// Holds every requested seat for `session_id`, or none of them.
    ///
    /// Seats already held by the same session are refreshed, so retrying is
    /// safe. The first conflicting seat, in request order, is reported.
    pub fn place_hold(
        &self,
        seat_ids: &[SeatId],
        session_id: &SessionId,
        ttl: Duration,
    ) -> Result<HoldToken> {
        if ttl <= Duration::zero() {
            return Err(InventoryError::InvalidTtl {
                seconds: ttl.num_seconds(),
            });
        }
        let seats = self.normalize(seat_ids)?;

        let now = self.clock.now();
        let mut state = self.write();
        let ttl = state.holds.policy().clamp_ttl(ttl);

        if let Err(err) = Self::check_all(&state, &seats, Claimant::Hold { session_id }, now) {
            metrics::counter!("hold_conflicts_total", "reason" => err.code()).increment(1);
            tracing::debug!(trip_id = %self.trip_id, %session_id, error = %err, "hold rejected");
            return Err(err);
        }

        let expires_at = now + ttl;
        for seat_id in &seats {
            state
                .holds
                .put(seat_id.clone(), session_id.clone(), now, ttl);
        }
        drop(state);

        metrics::counter!("holds_placed_total").increment(seats.len() as u64);
        tracing::debug!(
            trip_id = %self.trip_id,
            %session_id,
            seats = seats.len(),
            %expires_at,
            "seats held"
        );

        Ok(HoldToken {
            token: Uuid::new_v4(),
            trip_id: self.trip_id,
            session_id: session_id.clone(),
            seat_ids: seats,
            expires_at,
        })
    }

    /// Drops every hold owned by the session. Returns how many were dropped.
    pub fn release_hold(&self, session_id: &SessionId) -> usize {
        let released = self.write().holds.remove_by_session(session_id);
        if released > 0 {
            metrics::counter!("holds_released_total").increment(released as u64);
            tracing::debug!(trip_id = %self.trip_id, %session_id, released, "holds released");
        }
        released
    }

    /// Commits every requested seat to `booking_id`, or none of them.
    ///
    /// Seats are re-validated even when the caller holds them. A seat held by
    /// `session_id` stays eligible after its hold expires, as long as no
    /// other session has taken it since. Seats already committed to the same
    /// booking are accepted so a retried commit succeeds.
    pub fn commit_seats(
        &self,
        seat_ids: &[SeatId],
        booking_id: BookingId,
        session_id: Option<&SessionId>,
    ) -> Result<()> {
        let seats = self.normalize(seat_ids)?;

        let now = self.clock.now();
        let mut state = self.write();
        let claimant = Claimant::Commit {
            booking_id,
            session_id,
        };

        if let Err(err) = Self::check_all(&state, &seats, claimant, now) {
            metrics::counter!("seat_commit_conflicts_total", "reason" => err.code()).increment(1);
            tracing::warn!(trip_id = %self.trip_id, %booking_id, error = %err, "commit rejected");
            return Err(err);
        }

        state.holds.remove_by_seats(&seats);
        for seat_id in &seats {
            state.committed.insert(seat_id.clone(), booking_id);
        }
        let committed = state.committed.len();
        drop(state);

        metrics::counter!("seats_committed_total").increment(seats.len() as u64);
        tracing::info!(
            trip_id = %self.trip_id,
            %booking_id,
            seats = seats.len(),
            committed,
            "seats committed"
        );
        Ok(())
    }

    /// Returns seats committed under `booking_id` to the free pool.
    ///
    /// Seats committed to other bookings, or not committed at all, are left
    /// alone, so a retried cancellation is harmless.
    pub fn release_committed(&self, seat_ids: &[SeatId], booking_id: BookingId) -> usize {
        let mut state = self.write();
        let mut released = 0;
        for seat_id in seat_ids {
            if state.committed.get(seat_id) == Some(&booking_id) {
                state.committed.remove(seat_id);
                released += 1;
            }
        }
        drop(state);

        if released > 0 {
            metrics::counter!("seats_released_total").increment(released as u64);
            tracing::info!(trip_id = %self.trip_id, %booking_id, released, "committed seats released");
        }
        released
    }

    /// Seats currently committed to `booking_id`.
    pub fn seats_of(&self, booking_id: BookingId) -> Vec<SeatId> {
        let state = self.read();
        let mut seats: Vec<SeatId> = state
            .committed
            .iter()
            .filter(|(_, b)| **b == booking_id)
            .map(|(s, _)| s.clone())
            .collect();
        seats.sort();
        seats
    }

    /// Physically drops expired holds.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.write().holds.purge_expired(now)
    }

    fn normalize(&self, seat_ids: &[SeatId]) -> Result<Vec<SeatId>> {
        if seat_ids.is_empty() {
            return Err(InventoryError::EmptySelection);
        }
        let mut seen = HashSet::with_capacity(seat_ids.len());
        let mut seats = Vec::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            if !self.seat_map.is_valid_seat(seat_id) {
                return Err(InventoryError::UnknownSeat(seat_id.clone()));
            }
            if seen.insert(seat_id) {
                seats.push(seat_id.clone());
            }
        }
        Ok(seats)
    }

    fn check_all(
        state: &InventoryState,
        seats: &[SeatId],
        claimant: Claimant<'_>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        seats
            .iter()
            .try_for_each(|seat_id| Self::check_seat(state, seat_id, claimant, now))
    }

    fn check_seat(
        state: &InventoryState,
        seat_id: &SeatId,
        claimant: Claimant<'_>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(owner) = state.committed.get(seat_id) {
            return match claimant {
                Claimant::Commit { booking_id, .. } if *owner == booking_id => Ok(()),
                _ => Err(InventoryError::SeatAlreadyBooked(seat_id.clone())),
            };
        }

        let requester = match claimant {
            Claimant::Hold { session_id } => Some(session_id),
            Claimant::Commit { session_id, .. } => session_id,
        };

        // The owner's own hold counts even once expired; the ledger only
        // loses it when another session overwrites it.
        if let (Claimant::Commit { .. }, Some(session_id)) = (claimant, requester)
            && state
                .holds
                .recorded_hold(seat_id)
                .is_some_and(|hold| &hold.session_id == session_id)
        {
            return Ok(());
        }

        match state.holds.active_hold(seat_id, now) {
            Some(hold) if Some(&hold.session_id) != requester => {
                Err(InventoryError::SeatLockedByOther(seat_id.clone()))
            }
            _ => Ok(()),
        }
    }

    fn state_of(state: &InventoryState, seat_id: &SeatId, now: DateTime<Utc>) -> SeatState {
        if let Some(booking_id) = state.committed.get(seat_id) {
            return SeatState::Committed {
                booking_id: *booking_id,
            };
        }
        match state.holds.active_hold(seat_id, now) {
            Some(hold) => SeatState::Held {
                session_id: hold.session_id.clone(),
                expires_at: hold.expires_at,
            },
            None => SeatState::Free,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, InventoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InventoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SeatInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatInventory")
            .field("trip_id", &self.trip_id)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
