//! 🏗 HTTP request implementation

use std::io;
use std::io::{Read, Write};

use reservation_core::{ErrorKind, RequestKind};
use tiny_http::{Header, Response};
use tracing::warn;
use uuid::Uuid;

/// Length of any hyphenated UUID
const UUID_LEN: usize = b"a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8".len();

struct HTTPRequest(tiny_http::Request);

impl reservation_core::RawRequest for HTTPRequest {
    fn url(&self) -> &str {
        self.0.url()
    }

    fn method(&self) -> reservation_core::RequestMethod {
        match self.0.method() {
            tiny_http::Method::Get => reservation_core::RequestMethod::Get,
            tiny_http::Method::Post => reservation_core::RequestMethod::Post,
            _ => unreachable!(),
        }
    }

    fn read_string(&mut self) -> io::Result<String> {
        let mut s = String::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_string(&mut s)?;
        Ok(s)
    }

    fn respond_with_err(self: Box<Self>, kind: ErrorKind, msg: String, id: Uuid) {
        self.respond(
            Response::from_string(msg).with_status_code(status_code(kind)),
            id,
        )
    }

    fn respond_with_json(self: Box<Self>, body: String, id: Uuid) {
        let mut res = Response::from_string(body).with_status_code(200);
        res.add_header(Header::from_bytes(b"Content-Type", b"application/json").unwrap());
        self.respond(res, id)
    }
}

impl HTTPRequest {
    /// Add HTTP headers (CORS, X-Request-Id) to `res` and send it
    fn respond<R: Read>(self, mut res: Response<R>, id: Uuid) {
        add_response_cors_headers(&mut res);

        let mut rid = Vec::<u8>::with_capacity(UUID_LEN);
        write!(&mut rid, "{}", id.hyphenated()).unwrap();
        res.add_header(Header::from_bytes(b"X-Request-Id", rid).unwrap());

        if let Err(e) = self.0.respond(res) {
            warn!(%id, error = %e, "HTTP response failed");
        }
    }
}

/// HTTP status for each error kind
pub fn status_code(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::InvalidInput => 400,
        ErrorKind::NotFound => 404,
        ErrorKind::DuplicateResource | ErrorKind::Conflict => 409,
        ErrorKind::ResourceExhausted => 429,
        ErrorKind::ServiceUnavailable => 503,
    }
}

/// Parse the given HTTP request
///
/// If [`None`] is returned, the request was already answered with a
/// corresponding error message.
pub fn parse(rq: tiny_http::Request) -> Option<reservation_core::Request> {
    use tiny_http::Method::*;

    let kind = match (rq.method(), rq.url()) {
        (Options, _) => {
            let mut res = Response::empty(204);
            add_response_cors_headers(&mut res);
            reply(rq, res);
            return None;
        }
        (Post, "/api/purchase_ticket") => RequestKind::PurchaseTicket,
        (Post, "/api/get_ticket") => RequestKind::GetTicket,
        (Post, "/api/get_seats_by_section") => RequestKind::GetSeatsBySection,
        (Post, "/api/remove_user") => RequestKind::RemoveUser,
        (Post, "/api/modify_seat") => RequestKind::ModifySeat,
        (Get, url) | (Post, url) => {
            if url.starts_with("/api/debug") {
                RequestKind::Debug
            } else {
                let mut res = Response::from_string(
                    "🚆 could not find the service you are looking for!

Valid requests are:
  POST /api/purchase_ticket
  POST /api/get_ticket
  POST /api/get_seats_by_section
  POST /api/remove_user
  POST /api/modify_seat
  GET  /api/debug(.*)
  POST /api/debug(.*)",
                )
                .with_status_code(404);
                add_response_cors_headers(&mut res);
                reply(rq, res);
                return None;
            }
        }
        _ => {
            let mut res = Response::empty(405);
            add_response_cors_headers(&mut res);
            reply(rq, res);
            return None;
        }
    };

    let id = rq
        .headers()
        .iter()
        .find(|hdr| hdr.field.equiv("x-request-id"))
        .and_then(|hdr| Uuid::parse_str(hdr.value.as_str()).ok())
        .unwrap_or_else(Uuid::new_v4);

    Some(reservation_core::Request::from_raw(
        kind,
        id,
        Box::new(HTTPRequest(rq)),
    ))
}

/// Send a response that did not reach the request handler
fn reply<R: Read>(rq: tiny_http::Request, res: Response<R>) {
    if let Err(e) = rq.respond(res) {
        warn!(error = %e, "HTTP response failed");
    }
}

/// Add CORS headers to `res`
fn add_response_cors_headers<R: Read>(res: &mut Response<R>) {
    res.add_header(Header::from_bytes(b"Access-Control-Request-Method", b"*").unwrap());
    res.add_header(Header::from_bytes(b"Access-Control-Allow-Origin", b"*").unwrap());
    res.add_header(Header::from_bytes(b"Access-Control-Allow-Headers", b"*").unwrap());
    res.add_header(Header::from_bytes(b"Access-Control-Expose-Headers", b"*").unwrap());
}
