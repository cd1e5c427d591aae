//! Concurrency tests for the seat inventory.
//!
//! These race many threads against one trip and check that no seat is ever
//! handed out twice.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Duration;
use common::{BookingId, ManualClock, SeatId, SessionId, TripId};
use inventory::{ExpiryPolicy, InventoryError, SeatInventory, SeatMap, SeatState};

fn inventory(seat_map: SeatMap) -> Arc<SeatInventory> {
    Arc::new(SeatInventory::new(
        TripId::new(),
        seat_map,
        ExpiryPolicy::default(),
        Arc::new(ManualClock::default()),
    ))
}

#[test]
fn test_two_sessions_race_for_last_seat() {
    let inv = inventory(SeatMap::new(["A1"]));
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["sessionX", "sessionY"]
        .into_iter()
        .map(|name| {
            let inv = inv.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                inv.place_hold(
                    &[SeatId::from("A1")],
                    &SessionId::from(name),
                    Duration::seconds(900),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    let loss = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(loss, &InventoryError::SeatLockedByOther(SeatId::from("A1")));
}

#[test]
fn test_many_holds_for_same_seat_exactly_one_wins() {
    const CONTENDERS: usize = 64;
    let inv = inventory(SeatMap::grid(10, 4));
    let barrier = Arc::new(Barrier::new(CONTENDERS));

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|i| {
            let inv = inv.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                inv.place_hold(
                    &[SeatId::from("1A")],
                    &SessionId::new(format!("session-{i}")),
                    Duration::seconds(900),
                )
            })
        })
        .collect();

    let mut wins = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => wins += 1,
            Err(InventoryError::SeatLockedByOther(seat)) => assert_eq!(seat.as_str(), "1A"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(inv.snapshot().held, 1);
}

#[test]
fn test_many_commits_for_same_seat_exactly_one_wins() {
    const CONTENDERS: usize = 32;
    let inv = inventory(SeatMap::new(["A1", "A2"]));
    let barrier = Arc::new(Barrier::new(CONTENDERS));

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|_| {
            let inv = inv.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let booking = BookingId::new();
                barrier.wait();
                inv.commit_seats(&[SeatId::from("A2"), SeatId::from("A1")], booking, None)
                    .map(|()| booking)
            })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        match handle.join().unwrap() {
            Ok(booking) => winners.push(booking),
            Err(err) => assert_eq!(err, InventoryError::SeatAlreadyBooked(SeatId::from("A2"))),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(inv.seats_of(winners[0]).len(), 2);
}

#[test]
fn test_invariant_holds_under_mixed_load() {
    const WORKERS: usize = 16;
    const ROUNDS: usize = 50;
    let inv = inventory(SeatMap::grid(5, 4));
    let all_seats: Arc<Vec<SeatId>> = Arc::new(inv.seat_map().seats().cloned().collect());
    let barrier = Arc::new(Barrier::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let inv = inv.clone();
            let seats = all_seats.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let session = SessionId::new(format!("worker-{worker}"));
                let mut committed = Vec::new();
                barrier.wait();
                for round in 0..ROUNDS {
                    let a = seats[(worker * 7 + round) % seats.len()].clone();
                    let b = seats[(worker * 3 + round * 5) % seats.len()].clone();
                    let pick = [a, b];
                    match round % 4 {
                        0 | 1 => {
                            let _ = inv.place_hold(&pick, &session, Duration::seconds(900));
                        }
                        2 => {
                            let booking = BookingId::new();
                            if inv.commit_seats(&pick, booking, Some(&session)).is_ok() {
                                committed.push((booking, pick.to_vec()));
                            }
                        }
                        _ => {
                            inv.release_hold(&session);
                            if round % 8 == 3
                                && let Some((booking, seats)) = committed.pop()
                            {
                                inv.release_committed(&seats, booking);
                            }
                        }
                    }

                    let snapshot = inv.snapshot();
                    assert!(snapshot.committed + snapshot.held <= snapshot.capacity);
                }
                committed
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for (booking, seats) in handle.join().unwrap() {
            let owned = inv.seats_of(booking);
            let mut expected: Vec<SeatId> = seats.into_iter().collect::<HashSet<_>>().into_iter().collect();
            expected.sort();
            assert_eq!(owned, expected);
            for seat in owned {
                assert!(seen.insert(seat), "seat committed to two bookings");
            }
        }
    }

    for (seat, state) in inv.query_availability() {
        if let SeatState::Committed { booking_id } = state {
            assert!(inv.seats_of(booking_id).contains(&seat));
        }
    }
}
