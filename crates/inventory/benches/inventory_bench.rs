use std::sync::Arc;

use chrono::Duration;
use common::{BookingId, SeatId, SessionId, SystemClock, TripId};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use inventory::{ExpiryPolicy, SeatInventory, SeatMap};

fn new_inventory(rows: usize) -> SeatInventory {
    SeatInventory::new(
        TripId::new(),
        SeatMap::grid(rows, 4),
        ExpiryPolicy::default(),
        Arc::new(SystemClock),
    )
}

fn bench_place_and_release_hold(c: &mut Criterion) {
    let inv = new_inventory(12);
    let session = SessionId::from("bench");
    let seats = [SeatId::from("3A"), SeatId::from("3B")];

    c.bench_function("inventory/place_and_release_hold", |b| {
        b.iter(|| {
            inv.place_hold(&seats, &session, Duration::seconds(900))
                .unwrap();
            inv.release_hold(&session);
        });
    });
}

fn bench_commit_and_release(c: &mut Criterion) {
    let inv = new_inventory(12);
    let seats = [SeatId::from("5C"), SeatId::from("5D")];

    c.bench_function("inventory/commit_and_release", |b| {
        b.iter(|| {
            let booking = BookingId::new();
            inv.commit_seats(&seats, booking, None).unwrap();
            inv.release_committed(&seats, booking);
        });
    });
}

fn bench_query_availability(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory/query_availability");
    for rows in [10, 20, 40] {
        let inv = new_inventory(rows);
        for (i, seat) in inv.seat_map().seats().cloned().collect::<Vec<_>>().iter().enumerate() {
            if i % 3 == 0 {
                inv.place_hold(
                    std::slice::from_ref(seat),
                    &SessionId::new(format!("s{i}")),
                    Duration::seconds(900),
                )
                .unwrap();
            }
        }
        group.bench_with_input(BenchmarkId::from_parameter(rows * 4), &inv, |b, inv| {
            b.iter(|| inv.query_availability());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_place_and_release_hold,
    bench_commit_and_release,
    bench_query_availability
);
criterion_main!(benches);
