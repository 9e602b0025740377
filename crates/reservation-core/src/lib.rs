//! 🏗 Infrastructure for the train reservation service: data model, errors,
//! and the request plumbing shared by every transport.
#![warn(missing_docs)]

mod error;
mod model;
mod request;

pub use error::{ErrorKind, ReservationError, Result};
pub use model::{
    GetSeatsBySectionRequest, GetTicketRequest, ModifySeatRequest, PurchaseRequest,
    RemoveUserRequest, SeatId, SeatMap, SeatsResponse, SuccessResponse, Ticket, TicketResponse,
    User,
};
pub use request::{RawRequest, Request, RequestHandler, RequestKind, RequestMethod};

/// Configuration of the reservation service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Section codes, one letter each
    pub sections: Vec<char>,
    /// Number of seats pre-allocated in every section
    pub seats_per_section: u32,
    /// Fixed price of every ticket
    pub price: u32,
    /// Capacity of the operation queue, `0` for an unbounded queue
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sections: vec!['A', 'B'],
            seats_per_section: 20,
            price: 20,
            queue_capacity: 1024,
        }
    }
}

impl Config {
    /// Total number of seats on the train
    pub fn capacity(&self) -> usize {
        self.sections.len() * self.seats_per_section as usize
    }

    /// Check that every section code is a distinct ASCII letter
    pub fn validate(&self) -> Result<()> {
        let mut seen = Vec::with_capacity(self.sections.len());
        for &section in &self.sections {
            if !section.is_ascii_alphabetic() {
                return Err(ReservationError::InvalidInput(format!(
                    "section code {section:?} is not a letter"
                )));
            }
            if seen.contains(&section) {
                return Err(ReservationError::InvalidInput(format!(
                    "section {section} configured twice"
                )));
            }
            seen.push(section);
        }
        Ok(())
    }
}

/// The five reservation operations
///
/// Every implementation must execute each call as one atomic unit: either all
/// of its writes are committed or the call fails and nothing changed.
///
/// 📌 Hint: Methods may be called concurrently from different threads and
/// block until the result is available.
pub trait Reservations {
    /// Buy a ticket and bind the user to the first free seat
    fn purchase_ticket(&self, request: PurchaseRequest) -> Result<Ticket>;

    /// Look up the ticket held by `email`
    fn get_ticket(&self, email: &str) -> Result<Ticket>;

    /// Occupancy of every seat in `section`, empty for an unknown section
    fn get_seats_by_section(&self, section: char) -> Result<SeatMap>;

    /// Cancel the ticket held by `email` and free its seat
    fn remove_user(&self, email: &str) -> Result<()>;

    /// Move the ticket held by `email` to `new_seat`
    fn modify_seat(&self, email: &str, new_seat: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_train_has_forty_seats() {
        let config = Config::default();
        assert_eq!(config.capacity(), 40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_must_be_distinct_letters() {
        let config = |sections: &[char]| Config {
            sections: sections.to_vec(),
            ..Config::default()
        };
        assert!(config(&['A', '1']).validate().is_err());
        assert!(config(&['A', 'A']).validate().is_err());
        assert!(config(&['c', 'B']).validate().is_ok());
        // codes are compared exactly
        assert!(config(&['A', 'a']).validate().is_ok());
    }
}
