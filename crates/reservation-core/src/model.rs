//! Tickets, seats and the request shapes of the five operations

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReservationError;

/// A passenger, identified by email
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Unique key of the user
    pub email: String,
    /// Informational only
    pub first_name: String,
    /// Informational only
    pub last_name: String,
}

impl User {
    /// Create a [`User`]
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Seat identifier: a section letter followed by a positive number, e.g. `A1`
///
/// Seats order by section first, then by number, so `A2 < A10 < B1`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SeatId {
    section: char,
    number: u32,
}

impl SeatId {
    /// Create a [`SeatId`]
    ///
    /// # Panics
    ///
    /// Panics if `section` is not an ASCII letter or `number` is zero.
    pub fn new(section: char, number: u32) -> Self {
        assert!(section.is_ascii_alphabetic(), "section must be a letter");
        assert_ne!(number, 0, "seat numbers start at 1");
        Self {
            section,
            number,
        }
    }

    /// Get the section code
    #[inline]
    pub fn section(&self) -> char {
        self.section
    }

    /// Get the seat number within the section
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.section, self.number)
    }
}

impl FromStr for SeatId {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReservationError::InvalidInput(format!("malformed seat {s:?}"));

        let mut chars = s.chars();
        let section = chars.next().filter(char::is_ascii_alphabetic).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        match digits.parse::<u32>() {
            Ok(number) if number > 0 => Ok(SeatId::new(section, number)),
            _ => Err(invalid()),
        }
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

impl TryFrom<String> for SeatId {
    type Error = ReservationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Occupancy of a set of seats: the holder's email, or an empty string when free
pub type SeatMap = BTreeMap<SeatId, String>;

/// An active reservation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Origin station
    pub from: String,
    /// Destination station
    pub to: String,
    /// Holder of the ticket
    pub user: User,
    /// Fixed price
    pub price: u32,
    /// Currently assigned seat
    pub seat: SeatId,
}

/// Payload of a ticket purchase
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseRequest {
    /// Origin station
    pub from: String,
    /// Destination station
    pub to: String,
    /// Buyer of the ticket
    pub user: User,
}

impl PurchaseRequest {
    /// Create a [`PurchaseRequest`]
    pub fn new(from: impl Into<String>, to: impl Into<String>, user: User) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            user,
        }
    }
}

/// Payload of a ticket lookup
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetTicketRequest {
    /// Holder of the ticket
    pub email: String,
}

/// Payload of a seat listing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetSeatsBySectionRequest {
    /// Section code, exactly one letter
    pub section: String,
}

impl GetSeatsBySectionRequest {
    /// The section code, if the payload holds exactly one character
    pub fn section_code(&self) -> Option<char> {
        let mut chars = self.section.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// Payload of a ticket cancellation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveUserRequest {
    /// Holder of the ticket
    pub email: String,
}

/// Payload of a seat change
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModifySeatRequest {
    /// Holder of the ticket
    pub email: String,
    /// Seat to move to
    pub new_seat: String,
}

/// Response carrying a ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResponse {
    /// The purchased or requested ticket
    pub ticket: Ticket,
}

/// Response carrying the occupancy of a section
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatsResponse {
    /// Holder of every seat, empty string when free
    pub seats: SeatMap,
}

/// Response of operations without a result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true`; failures are reported as errors
    pub success: bool,
}
