//! Static seat layout of the vehicle assigned to a trip.

use std::collections::HashSet;

use common::SeatId;

/// The set of valid seat identifiers for one trip, in layout order.
///
/// Capacity is the number of seats in the layout and never changes once the
/// map is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMap {
    seats: Vec<SeatId>,
    index: HashSet<SeatId>,
}

impl SeatMap {
    /// Builds a seat map from a layout. Repeated ids are kept once.
    pub fn new<I, S>(layout: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SeatId>,
    {
        let mut seats = Vec::new();
        let mut index = HashSet::new();
        for seat in layout {
            let seat = seat.into();
            if index.insert(seat.clone()) {
                seats.push(seat);
            }
        }
        Self { seats, index }
    }

    /// Most seats a grid row can label, one letter each.
    pub const MAX_SEATS_PER_ROW: usize = 26;

    /// Builds a coach layout of `rows` rows with `per_row` seats each,
    /// labelled `1A, 1B, ..., 2A, ...`.
    ///
    /// # Panics
    ///
    /// Panics if `per_row` exceeds [`Self::MAX_SEATS_PER_ROW`].
    pub fn grid(rows: usize, per_row: usize) -> Self {
        assert!(
            per_row <= Self::MAX_SEATS_PER_ROW,
            "a grid row holds at most {} seats, got {per_row}",
            Self::MAX_SEATS_PER_ROW
        );
        let letters: Vec<char> = ('A'..='Z').take(per_row).collect();
        Self::new(
            (1..=rows).flat_map(|row| letters.iter().map(move |l| format!("{row}{l}"))),
        )
    }

    pub fn is_valid_seat(&self, seat_id: &SeatId) -> bool {
        self.index.contains(seat_id)
    }

    pub fn capacity(&self) -> usize {
        self.seats.len()
    }

    /// Seats in layout order.
    pub fn seats(&self) -> impl Iterator<Item = &SeatId> {
        self.seats.iter()
    }
}
