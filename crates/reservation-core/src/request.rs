use std::io;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ErrorKind, ReservationError};

/// Kind of the request
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum RequestKind {
    /// Buy a ticket
    ///
    /// The payload is a [`PurchaseRequest`](crate::PurchaseRequest), the
    /// response includes the created ticket.
    PurchaseTicket,

    /// Retrieve the ticket held by a user
    ///
    /// The payload is a [`GetTicketRequest`](crate::GetTicketRequest).
    GetTicket,

    /// Retrieve the occupancy of every seat in a section
    ///
    /// The payload is a
    /// [`GetSeatsBySectionRequest`](crate::GetSeatsBySectionRequest).
    GetSeatsBySection,

    /// Cancel the ticket held by a user
    ///
    /// The payload is a [`RemoveUserRequest`](crate::RemoveUserRequest).
    RemoveUser,

    /// Move a ticket to another seat
    ///
    /// The payload is a [`ModifySeatRequest`](crate::ModifySeatRequest).
    ModifySeat,

    /// Useful for sending information for debugging
    Debug,
}

/// Request received by a transport
///
/// 📌 Hint: The request handler primarily interacts with instances of this
/// class.
pub struct Request {
    kind: RequestKind,
    id: Uuid,
    raw: Box<dyn RawRequest + Send>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// HTTP request method
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RequestMethod {
    /// GET request
    Get,
    /// POST request, may have a payload
    Post,
}

/// Interface for handling requests from a transport
pub trait RequestHandler {
    /// Handle a request
    ///
    /// This method may be called concurrently from different threads.
    fn handle(&self, request: Request);

    /// Shut the reservation service down
    ///
    /// Every request handed to [`Self::handle()`] before this call is answered
    /// before this method returns.
    fn shutdown(self);
}

/// A raw request, implemented by each transport
pub trait RawRequest {
    /// Get the URL
    fn url(&self) -> &str;
    /// Get the request method
    fn method(&self) -> RequestMethod;

    /// Read the request body as string
    fn read_string(&mut self) -> io::Result<String>;

    /// Respond with an error of the given kind
    fn respond_with_err(self: Box<Self>, kind: ErrorKind, msg: String, id: Uuid);
    /// Respond with a JSON document
    fn respond_with_json(self: Box<Self>, body: String, id: Uuid);
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Get the request id
    ///
    /// If the client did not send one, it is randomly generated.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the request URL
    #[inline]
    pub fn url(&self) -> &str {
        self.raw.url()
    }

    /// Get the request method
    #[inline]
    #[allow(unused)]
    pub fn method(&self) -> RequestMethod {
        self.raw.method()
    }

    /// Read the payload as a UTF-8 string
    ///
    /// 📌 Hint: This method has side effects and should be called only once per
    /// request.
    #[inline]
    pub fn read_string(&mut self) -> io::Result<String> {
        self.raw.read_string()
    }

    /// Decode the JSON payload
    ///
    /// An empty body decodes like `{}`. Malformed payloads are reported as
    /// [`ReservationError::InvalidInput`].
    pub fn read_json<T: DeserializeOwned>(&mut self) -> Result<T, ReservationError> {
        let body = self
            .read_string()
            .map_err(|e| ReservationError::InvalidInput(format!("unreadable payload: {e}")))?;
        let body = if body.trim().is_empty() { "{}" } else { &body };
        serde_json::from_str(body)
            .map_err(|e| ReservationError::InvalidInput(format!("malformed payload: {e}")))
    }

    /// Respond with the given error
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_err(self, err: &ReservationError) {
        self.raw.respond_with_err(err.kind(), err.to_string(), self.id);
    }

    /// Respond with a JSON document
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_json(self, body: String) {
        self.raw.respond_with_json(body, self.id);
    }

    /// Create a new request from a [`RawRequest`]
    #[inline]
    pub fn from_raw(kind: RequestKind, id: Uuid, raw: Box<dyn RawRequest + Send>) -> Self {
        Self { kind, id, raw }
    }
}
