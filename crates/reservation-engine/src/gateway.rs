//! Implementation of the gateway between transports and the reservation engine
use reservation_core::{
    GetSeatsBySectionRequest, GetTicketRequest, ModifySeatRequest, PurchaseRequest,
    RemoveUserRequest, Request, RequestHandler, RequestKind, ReservationError, Result, SeatMap,
    SeatsResponse, SuccessResponse, TicketResponse,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::Engine;

/// Implementation of the request handler
///
/// Decodes the payload of each [`Request`], runs the matching operation on the
/// engine and encodes the result. Errors are handed to the transport, which
/// picks its own representation for each [`ErrorKind`](reservation_core::ErrorKind).
pub struct Gateway<E> {
    engine: E,
}

impl<E: Engine> Gateway<E> {
    /// Create a new [`Gateway`]
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Get the engine processing the operations
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn respond<T: Serialize>(rq: Request, outcome: Result<T>) {
        let encoded = outcome.and_then(|body| {
            serde_json::to_string(&body)
                .map_err(|e| ReservationError::InvalidInput(format!("unencodable result: {e}")))
        });
        match encoded {
            Ok(body) => rq.respond_with_json(body),
            Err(err) => {
                warn!(id = %rq.id(), kind = ?rq.kind(), %err, "request rejected");
                rq.respond_with_err(&err);
            }
        }
    }
}

impl<E: Engine> RequestHandler for Gateway<E> {
    fn handle(&self, mut rq: Request) {
        debug!(id = %rq.id(), kind = ?rq.kind(), "request");
        match *rq.kind() {
            RequestKind::PurchaseTicket => {
                let outcome = rq
                    .read_json::<PurchaseRequest>()
                    .and_then(|payload| self.engine.purchase_ticket(payload))
                    .map(|ticket| TicketResponse { ticket });
                Self::respond(rq, outcome);
            }
            RequestKind::GetTicket => {
                let outcome = rq
                    .read_json::<GetTicketRequest>()
                    .and_then(|payload| self.engine.get_ticket(&payload.email))
                    .map(|ticket| TicketResponse { ticket });
                Self::respond(rq, outcome);
            }
            RequestKind::GetSeatsBySection => {
                let outcome = rq
                    .read_json::<GetSeatsBySectionRequest>()
                    .and_then(|payload| match payload.section_code() {
                        Some(section) => self.engine.get_seats_by_section(section),
                        // section codes are single characters
                        None => Ok(SeatMap::new()),
                    })
                    .map(|seats| SeatsResponse { seats });
                Self::respond(rq, outcome);
            }
            RequestKind::RemoveUser => {
                let outcome = rq
                    .read_json::<RemoveUserRequest>()
                    .and_then(|payload| self.engine.remove_user(&payload.email))
                    .map(|()| SuccessResponse { success: true });
                Self::respond(rq, outcome);
            }
            RequestKind::ModifySeat => {
                let outcome = rq
                    .read_json::<ModifySeatRequest>()
                    .and_then(|payload| self.engine.modify_seat(&payload.email, &payload.new_seat))
                    .map(|()| SuccessResponse { success: true });
                Self::respond(rq, outcome);
            }
            RequestKind::Debug => {
                let body = json!({ "engine": E::NAME, "url": rq.url() });
                Self::respond(rq, Ok(body));
            }
        }
    }

    fn shutdown(self) {
        self.engine.stop();
    }
}
