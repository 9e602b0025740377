use thiserror::Error;

/// Errors reported by the reservation operations
///
/// A failed operation leaves the reservation state exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// A required field is missing or malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The user already holds a ticket
    #[error("ticket already exists for {0}")]
    DuplicateResource(String),
    /// Every seat is taken
    #[error("no seats available")]
    ResourceExhausted,
    /// No ticket (or seat) with that key
    #[error("{0} not found")]
    NotFound(String),
    /// The requested seat is held by another ticket
    #[error("seat {0} already in use")]
    Conflict(String),
    /// The service stopped accepting operations
    #[error("reservation service is shut down")]
    ServiceUnavailable,
}

/// Result of a reservation operation
pub type Result<T> = std::result::Result<T, ReservationError>;

/// Fieldless error kind, used by transports to pick their own representation
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ErrorKind {
    /// See [`ReservationError::InvalidInput`]
    InvalidInput,
    /// See [`ReservationError::DuplicateResource`]
    DuplicateResource,
    /// See [`ReservationError::ResourceExhausted`]
    ResourceExhausted,
    /// See [`ReservationError::NotFound`]
    NotFound,
    /// See [`ReservationError::Conflict`]
    Conflict,
    /// See [`ReservationError::ServiceUnavailable`]
    ServiceUnavailable,
}

impl ReservationError {
    /// Get the error's kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::InvalidInput(_) => ErrorKind::InvalidInput,
            ReservationError::DuplicateResource(_) => ErrorKind::DuplicateResource,
            ReservationError::ResourceExhausted => ErrorKind::ResourceExhausted,
            ReservationError::NotFound(_) => ErrorKind::NotFound,
            ReservationError::Conflict(_) => ErrorKind::Conflict,
            ReservationError::ServiceUnavailable => ErrorKind::ServiceUnavailable,
        }
    }
}
