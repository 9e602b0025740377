//! Implementation of the reservation state: tickets and seat occupancy

use std::collections::HashMap;

use reservation_core::{
    Config, PurchaseRequest, ReservationError, Result, SeatId, SeatMap, Ticket,
};

use crate::allocator;

/// Tickets and seats of one train
///
/// Every method either commits all of its writes or fails without touching the
/// state. `seats` and `tickets` always agree: a ticket's seat is held by the
/// ticket's email and every held seat belongs to exactly one ticket.
#[derive(Clone, Debug)]
pub struct Store {
    /// Occupancy of every pre-allocated seat, empty string when free
    seats: SeatMap,
    /// Active tickets by email
    tickets: HashMap<String, Ticket>,
    /// Price of every ticket
    price: u32,
}

impl Store {
    /// Create a new [`Store`] with all seats of `config` free
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let seats = config
            .sections
            .iter()
            .flat_map(|&section| {
                (1..=config.seats_per_section).map(move |n| (SeatId::new(section, n), String::new()))
            })
            .collect();
        Ok(Self {
            seats,
            tickets: HashMap::new(),
            price: config.price,
        })
    }

    /// Sell a ticket on the first free seat
    pub fn purchase(&mut self, request: PurchaseRequest) -> Result<Ticket> {
        let email = request.user.email.clone();
        if email.is_empty() {
            return Err(ReservationError::InvalidInput("user email is required".into()));
        }
        if self.tickets.contains_key(&email) {
            return Err(ReservationError::DuplicateResource(email));
        }
        let seat = allocator::first_free(&self.seats).ok_or(ReservationError::ResourceExhausted)?;

        let ticket = Ticket {
            from: request.from,
            to: request.to,
            user: request.user,
            price: self.price,
            seat,
        };
        self.seats.insert(seat, email.clone());
        self.tickets.insert(email, ticket.clone());
        Ok(ticket)
    }

    /// Get the ticket held by `email`
    pub fn ticket(&self, email: &str) -> Result<Ticket> {
        self.tickets
            .get(email)
            .cloned()
            .ok_or_else(|| not_found(email))
    }

    /// Get the occupancy of every seat in `section`
    pub fn seats_by_section(&self, section: char) -> SeatMap {
        if !section.is_ascii_alphabetic() {
            return SeatMap::new();
        }
        let first = SeatId::new(section, 1);
        self.seats
            .range(first..)
            .take_while(|(seat, _)| seat.section() == section)
            .map(|(seat, holder)| (*seat, holder.clone()))
            .collect()
    }

    /// Cancel the ticket held by `email`
    pub fn remove(&mut self, email: &str) -> Result<()> {
        let ticket = self.tickets.remove(email).ok_or_else(|| not_found(email))?;
        self.seats.insert(ticket.seat, String::new());
        Ok(())
    }

    /// Move the ticket held by `email` to `new_seat`
    pub fn modify_seat(&mut self, email: &str, new_seat: &str) -> Result<()> {
        let Some(ticket) = self.tickets.get_mut(email) else {
            return Err(not_found(email));
        };
        let target: SeatId = new_seat.parse()?;
        let taken = match self.seats.get(&target) {
            Some(holder) => !holder.is_empty(),
            None => return Err(ReservationError::NotFound(format!("seat {target}"))),
        };

        if ticket.seat == target {
            return Ok(());
        }
        if taken {
            return Err(ReservationError::Conflict(target.to_string()));
        }

        self.seats.insert(ticket.seat, String::new());
        self.seats.insert(target, email.to_owned());
        ticket.seat = target;
        Ok(())
    }

    /// Number of pre-allocated seats
    pub fn capacity(&self) -> usize {
        self.seats.len()
    }

    /// Number of active tickets
    pub fn num_tickets(&self) -> usize {
        self.tickets.len()
    }

    /// Panic if seats and tickets disagree
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        for (email, ticket) in &self.tickets {
            assert_eq!(&ticket.user.email, email);
            assert_eq!(self.seats.get(&ticket.seat), Some(email), "{ticket:?}");
        }
        let held = self.seats.values().filter(|h| !h.is_empty()).count();
        assert_eq!(held, self.tickets.len(), "a seat is held without a ticket");
    }
}

fn not_found(email: &str) -> ReservationError {
    ReservationError::NotFound(format!("ticket for {email}"))
}

#[cfg(test)]
mod tests {
    use reservation_core::User;

    use super::*;

    fn store(sections: &[char], seats_per_section: u32) -> Store {
        Store::new(&Config {
            sections: sections.to_vec(),
            seats_per_section,
            ..Config::default()
        })
        .unwrap()
    }

    fn purchase(store: &mut Store, email: &str) -> Result<Ticket> {
        store.purchase(PurchaseRequest::new(
            "London",
            "Paris",
            User::new(email, "First", "Last"),
        ))
    }

    #[test]
    fn seats_are_preallocated() {
        let store = store(&['A', 'b'], 3);
        assert_eq!(store.capacity(), 6);
        let b = store.seats_by_section('b');
        let names: Vec<String> = b.keys().map(ToString::to_string).collect();
        assert_eq!(names, ["b1", "b2", "b3"]);
        assert!(b.values().all(String::is_empty));
        assert!(store.seats_by_section('B').is_empty());
    }

    #[test]
    fn purchase_takes_first_free_seat() {
        let mut store = store(&['A'], 20);
        let ticket = purchase(&mut store, "a@x.com").unwrap();
        assert_eq!(ticket.seat, SeatId::new('A', 1));
        assert_eq!(ticket.price, 20);
        assert_eq!(ticket.from, "London");
        assert_eq!(ticket.to, "Paris");

        let seats = store.seats_by_section('A');
        assert_eq!(seats.len(), 20);
        assert_eq!(seats[&SeatId::new('A', 1)], "a@x.com");
        assert_eq!(seats.values().filter(|h| h.is_empty()).count(), 19);
        store.assert_consistent();
    }

    #[test]
    fn empty_email_is_rejected() {
        let mut store = store(&['A'], 2);
        assert!(matches!(
            purchase(&mut store, ""),
            Err(ReservationError::InvalidInput(_))
        ));
        assert_eq!(store.num_tickets(), 0);
        store.assert_consistent();
    }

    #[test]
    fn whitespace_email_is_a_valid_key() {
        let mut store = store(&['A'], 2);
        let ticket = purchase(&mut store, " ").unwrap();
        assert_eq!(ticket.seat, SeatId::new('A', 1));
        assert_eq!(store.ticket(" ").unwrap(), ticket);
        assert!(matches!(
            store.ticket(""),
            Err(ReservationError::NotFound(_))
        ));
        store.assert_consistent();
    }

    #[test]
    fn duplicate_purchase_changes_nothing() {
        let mut store = store(&['A'], 2);
        purchase(&mut store, "a@x.com").unwrap();
        let before = store.seats_by_section('A');

        assert_eq!(
            purchase(&mut store, "a@x.com"),
            Err(ReservationError::DuplicateResource("a@x.com".into()))
        );
        assert_eq!(store.seats_by_section('A'), before);
        assert_eq!(store.num_tickets(), 1);
        store.assert_consistent();
    }

    #[test]
    fn sold_out() {
        let mut store = store(&['A'], 1);
        purchase(&mut store, "a@x.com").unwrap();
        assert_eq!(
            purchase(&mut store, "b@x.com"),
            Err(ReservationError::ResourceExhausted)
        );
        store.assert_consistent();
    }

    #[test]
    fn unknown_sections_are_empty() {
        let store = store(&['A'], 2);
        assert!(store.seats_by_section('C').is_empty());
        assert!(store.seats_by_section('1').is_empty());
        assert_eq!(store.seats_by_section('A').len(), 2);
        // section codes are matched exactly
        assert!(store.seats_by_section('a').is_empty());
    }

    #[test]
    fn remove_frees_the_seat_for_others() {
        let mut store = store(&['A'], 1);
        purchase(&mut store, "a@x.com").unwrap();
        store.remove("a@x.com").unwrap();
        assert!(matches!(
            store.ticket("a@x.com"),
            Err(ReservationError::NotFound(_))
        ));
        assert_eq!(store.seats_by_section('A')[&SeatId::new('A', 1)], "");

        let ticket = purchase(&mut store, "b@x.com").unwrap();
        assert_eq!(ticket.seat, SeatId::new('A', 1));
        store.assert_consistent();
    }

    #[test]
    fn remove_unknown_user() {
        let mut store = store(&['A'], 1);
        assert!(matches!(
            store.remove("nobody@x.com"),
            Err(ReservationError::NotFound(_))
        ));
    }

    #[test]
    fn modify_seat_moves_the_ticket() {
        let mut store = store(&['A', 'B'], 2);
        purchase(&mut store, "a@x.com").unwrap();
        assert!(matches!(
            store.modify_seat("a@x.com", "b2"),
            Err(ReservationError::NotFound(_))
        ));
        store.modify_seat("a@x.com", "B2").unwrap();

        assert_eq!(store.ticket("a@x.com").unwrap().seat, SeatId::new('B', 2));
        assert_eq!(store.seats_by_section('A')[&SeatId::new('A', 1)], "");
        assert_eq!(store.seats_by_section('B')[&SeatId::new('B', 2)], "a@x.com");
        store.assert_consistent();
    }

    #[test]
    fn modify_seat_onto_taken_seat_conflicts() {
        let mut store = store(&['A'], 2);
        purchase(&mut store, "a@x.com").unwrap();
        purchase(&mut store, "b@x.com").unwrap();

        assert_eq!(
            store.modify_seat("a@x.com", "A2"),
            Err(ReservationError::Conflict("A2".into()))
        );
        assert_eq!(store.ticket("a@x.com").unwrap().seat, SeatId::new('A', 1));
        store.assert_consistent();
    }

    #[test]
    fn modify_seat_onto_own_seat_is_a_no_op() {
        let mut store = store(&['A'], 20);
        purchase(&mut store, "a@x.com").unwrap();
        store.modify_seat("a@x.com", "A1").unwrap();
        assert_eq!(store.ticket("a@x.com").unwrap().seat, SeatId::new('A', 1));
        store.assert_consistent();
    }

    #[test]
    fn modify_seat_rejects_bad_targets() {
        let mut store = store(&['A'], 2);
        assert!(matches!(
            store.modify_seat("a@x.com", "A2"),
            Err(ReservationError::NotFound(_))
        ));

        purchase(&mut store, "a@x.com").unwrap();
        assert!(matches!(
            store.modify_seat("a@x.com", "2A"),
            Err(ReservationError::InvalidInput(_))
        ));
        assert!(matches!(
            store.modify_seat("a@x.com", "A3"),
            Err(ReservationError::NotFound(_))
        ));
        assert!(matches!(
            store.modify_seat("a@x.com", "C1"),
            Err(ReservationError::NotFound(_))
        ));
        assert_eq!(store.capacity(), 2);
        assert_eq!(store.ticket("a@x.com").unwrap().seat, SeatId::new('A', 1));
        store.assert_consistent();
    }

    #[test]
    fn invalid_config() {
        let config = Config {
            sections: vec!['A', '?'],
            ..Config::default()
        };
        assert!(matches!(
            Store::new(&config),
            Err(ReservationError::InvalidInput(_))
        ));
    }
}
