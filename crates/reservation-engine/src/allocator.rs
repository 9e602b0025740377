//! Seat selection for new tickets

use reservation_core::{SeatId, SeatMap};

/// Pick the free seat with the lowest section code, then the lowest number
///
/// Returns [`None`] when every seat is taken. The seat is not marked as
/// occupied; that is left to the caller so that allocation and commit happen
/// within one operation.
pub fn first_free(seats: &SeatMap) -> Option<SeatId> {
    // `SeatMap` iterates in (section, number) order
    seats
        .iter()
        .find(|(_, holder)| holder.is_empty())
        .map(|(seat, _)| *seat)
}
