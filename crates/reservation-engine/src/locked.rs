//! 🔒 The reservation state behind a single lock
//!
//! Satisfies the same contract as the [`Serializer`](crate::Serializer):
//! callers queue up on one [`Mutex`] instead of a channel, and each operation
//! runs to completion while holding it.

use parking_lot::Mutex;
use reservation_core::{Config, PurchaseRequest, Reservations, Result, SeatMap, Ticket};
use tracing::debug;

use crate::store::Store;

/// Reservation service processing operations under one lock
pub struct Locked(Mutex<Store>);

impl Locked {
    /// Create the service for a train described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self(Mutex::new(Store::new(config)?)))
    }
}

impl Reservations for Locked {
    fn purchase_ticket(&self, request: PurchaseRequest) -> Result<Ticket> {
        debug!(operation = "purchase_ticket", "executing");
        self.0.lock().purchase(request)
    }

    fn get_ticket(&self, email: &str) -> Result<Ticket> {
        debug!(operation = "get_ticket", "executing");
        self.0.lock().ticket(email)
    }

    fn get_seats_by_section(&self, section: char) -> Result<SeatMap> {
        debug!(operation = "get_seats_by_section", "executing");
        Ok(self.0.lock().seats_by_section(section))
    }

    fn remove_user(&self, email: &str) -> Result<()> {
        debug!(operation = "remove_user", "executing");
        self.0.lock().remove(email)
    }

    fn modify_seat(&self, email: &str, new_seat: &str) -> Result<()> {
        debug!(operation = "modify_seat", "executing");
        self.0.lock().modify_seat(email, new_seat)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use reservation_core::{ReservationError, User};

    use super::*;

    #[test]
    fn concurrent_swaps_keep_the_state_consistent() {
        let locked = Locked::new(&Config {
            sections: vec!['A'],
            seats_per_section: 8,
            ..Config::default()
        })
        .unwrap();
        for i in 0..4 {
            locked
                .purchase_ticket(PurchaseRequest::new(
                    "London",
                    "Paris",
                    User::new(format!("{i}@x.com"), "", ""),
                ))
                .unwrap();
        }

        // everybody races for the free seats A5..A8
        thread::scope(|s| {
            for i in 0..4 {
                let locked = &locked;
                s.spawn(move || {
                    for seat in 5..=8 {
                        match locked.modify_seat(&format!("{i}@x.com"), &format!("A{seat}")) {
                            Ok(()) | Err(ReservationError::Conflict(_)) => {}
                            Err(e) => panic!("unexpected error {e}"),
                        }
                    }
                });
            }
        });

        locked.0.lock().assert_consistent();
        let seats: HashSet<_> = (0..4)
            .map(|i| locked.get_ticket(&format!("{i}@x.com")).unwrap().seat)
            .collect();
        assert_eq!(seats.len(), 4);
    }
}
