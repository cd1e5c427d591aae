//! Background sweep that expires stale pending bookings and purges dead holds.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::AppState;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub expired_bookings: usize,
    pub purged_holds: usize,
}

/// Runs one sweep over every trip. Failures are logged, never returned.
pub async fn sweep(state: &AppState) -> SweepReport {
    let purged_holds = state.orchestrator.inventories().purge_expired();
    let expired_bookings = match state.orchestrator.expire_stale_pending().await {
        Ok(expired) => expired.len(),
        Err(err) => {
            tracing::warn!(error = %err, "pending booking sweep failed");
            0
        }
    };

    if purged_holds > 0 {
        metrics::counter!("holds_purged_total").increment(purged_holds as u64);
    }
    if purged_holds > 0 || expired_bookings > 0 {
        tracing::info!(purged_holds, expired_bookings, "reaper sweep");
    }

    SweepReport {
        expired_bookings,
        purged_holds,
    }
}

/// Spawns the periodic sweep. It runs until the runtime shuts down.
pub fn spawn(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep(&state).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use booking::{
        Actor, BookingOrchestrator, BookingPolicy, CreateBooking, InMemoryBookingRepository,
        InMemoryTripCatalog, Trip,
    };
    use chrono::Utc;
    use common::{Clock, ManualClock, Money, SeatId, SessionId, TripId};
    use inventory::{ExpiryPolicy, InventoryRegistry};

    use super::*;

    fn state(clock: &ManualClock, trip: &Trip) -> AppState {
        let catalog = InMemoryTripCatalog::with_trips([trip.clone()]);
        AppState {
            orchestrator: BookingOrchestrator::new(
                InventoryRegistry::new(ExpiryPolicy::default(), Arc::new(clock.clone())),
                Arc::new(catalog.clone()),
                Arc::new(InMemoryBookingRepository::new()),
                BookingPolicy::default(),
            ),
            catalog,
            default_hold_ttl: chrono::Duration::minutes(15),
        }
    }

    #[tokio::test]
    async fn test_sweep_expires_bookings_and_holds() {
        let clock = ManualClock::new(Utc::now());
        let trip = Trip::new(
            TripId::new(),
            Money::from_cents(1000),
            clock.now() + chrono::Duration::days(3),
            vec![SeatId::from("1A"), SeatId::from("1B")],
        );
        let state = state(&clock, &trip);

        state
            .orchestrator
            .hold_seats(
                trip.id,
                &[SeatId::from("1A")],
                &SessionId::from("s1"),
                chrono::Duration::minutes(5),
            )
            .await
            .unwrap();
        state
            .orchestrator
            .create_booking(
                Actor::anonymous(),
                CreateBooking::new(trip.id, vec![SeatId::from("1B")]),
            )
            .await
            .unwrap();

        assert_eq!(sweep(&state).await, SweepReport::default());

        clock.advance(chrono::Duration::minutes(20));
        assert_eq!(
            sweep(&state).await,
            SweepReport {
                expired_bookings: 1,
                purged_holds: 1
            }
        );

        let availability = state.orchestrator.availability(trip.id).await.unwrap();
        assert_eq!(availability.available, 2);
    }
}
