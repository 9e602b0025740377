use std::sync::Arc;

use eyre::{eyre, Result};
use flume::Sender;
use nanorand::Rng;
use reservation_core::{
    ErrorKind, GetSeatsBySectionRequest, GetTicketRequest, ModifySeatRequest, PurchaseRequest,
    RemoveUserRequest, RequestKind, SeatId, SeatMap, SeatsResponse, SuccessResponse, Ticket,
    TicketResponse, User,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

pub mod mock;

#[derive(Debug, Error)]
#[error("{kind:?}: {msg}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub msg: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum Response {
    Error {
        kind: ErrorKind,
        msg: String,
        request_id: Uuid,
    },
    Json {
        body: String,
        request_id: Uuid,
    },
}

impl Response {
    fn into_api_response<T: DeserializeOwned>(self) -> Result<ApiResponse<T>> {
        Ok(match self {
            Response::Error {
                kind,
                msg,
                request_id,
            } => ApiResponse {
                request_id,
                result: Err(ApiError { kind, msg }),
            },
            Response::Json { body, request_id } => ApiResponse {
                request_id,
                result: Ok(serde_json::from_str(&body)
                    .map_err(|e| eyre!("undecodable response {body:?}: {e}"))?),
            },
        })
    }
}

struct RequestMsg {
    kind: RequestKind,
    payload: String,
    request_id: Uuid,
    response_channel: oneshot::Sender<Response>,
}

pub struct Api {
    /// One channel per handler thread
    channels: Arc<Vec<Sender<RequestMsg>>>,

    my_channel: Sender<RequestMsg>,
    my_index: usize,
}

impl Api {
    fn new(channels: Vec<Sender<RequestMsg>>) -> Self {
        let my_channel = channels[0].clone();
        Self {
            channels: Arc::new(channels),
            my_channel,
            my_index: 0,
        }
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let my_index = (self.my_index + 1) % self.channels.len();
        Self {
            channels: self.channels.clone(),
            my_channel: self.channels[my_index].clone(),
            my_index,
        }
    }
}

impl Api {
    async fn make_request<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        payload: &impl Serialize,
    ) -> Result<ApiResponse<T>> {
        let (sender, receiver) = oneshot::channel();
        let msg = RequestMsg {
            kind,
            payload: serde_json::to_string(payload)?,
            request_id: Uuid::new_v4(),
            response_channel: sender,
        };
        self.my_channel.send_async(msg).await?;
        receiver.await?.into_api_response()
    }

    pub async fn purchase_ticket(&self, request: &PurchaseRequest) -> Result<ApiResponse<Ticket>> {
        let response: ApiResponse<TicketResponse> =
            self.make_request(RequestKind::PurchaseTicket, request).await?;
        Ok(response.map(|r| r.ticket))
    }

    pub async fn get_ticket(&self, email: &str) -> Result<ApiResponse<Ticket>> {
        let request = GetTicketRequest {
            email: email.into(),
        };
        let response: ApiResponse<TicketResponse> =
            self.make_request(RequestKind::GetTicket, &request).await?;
        Ok(response.map(|r| r.ticket))
    }

    pub async fn get_seats_by_section(&self, section: &str) -> Result<ApiResponse<SeatMap>> {
        let request = GetSeatsBySectionRequest {
            section: section.into(),
        };
        let response: ApiResponse<SeatsResponse> =
            self.make_request(RequestKind::GetSeatsBySection, &request).await?;
        Ok(response.map(|r| r.seats))
    }

    pub async fn remove_user(&self, email: &str) -> Result<ApiResponse<bool>> {
        let request = RemoveUserRequest {
            email: email.into(),
        };
        let response: ApiResponse<SuccessResponse> =
            self.make_request(RequestKind::RemoveUser, &request).await?;
        Ok(response.map(|r| r.success))
    }

    pub async fn modify_seat(&self, email: &str, new_seat: &str) -> Result<ApiResponse<bool>> {
        let request = ModifySeatRequest {
            email: email.into(),
            new_seat: new_seat.into(),
        };
        let response: ApiResponse<SuccessResponse> =
            self.make_request(RequestKind::ModifySeat, &request).await?;
        Ok(response.map(|r| r.success))
    }

    pub async fn debug(&self) -> Result<ApiResponse<serde_json::Value>> {
        self.make_request(RequestKind::Debug, &serde_json::json!({}))
            .await
    }

    /// Create a passenger with a random email address
    pub fn create_passenger(&self) -> Passenger {
        let mut bytes = [0u8; 8];
        nanorand::tls_rng().fill(&mut bytes);
        let tag: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        self.create_passenger_with_email(format!("passenger-{tag}@example.com"))
    }

    pub fn create_passenger_with_email(&self, email: impl Into<String>) -> Passenger {
        Passenger {
            api: self,
            user: User::new(email, "Test", "Passenger"),
            seat: None,
        }
    }
}

pub struct ApiResponse<T> {
    pub request_id: Uuid,
    pub result: ApiResult<T>,
}

impl<T> ApiResponse<T> {
    pub fn map<R, F: FnOnce(T) -> R>(self, func: F) -> ApiResponse<R> {
        ApiResponse {
            request_id: self.request_id,
            result: self.result.map(func),
        }
    }

    /// Get the error kind, failing if the request succeeded
    pub fn err_kind(self) -> Result<ErrorKind> {
        match self.result {
            Ok(_) => Err(eyre!("request succeeded when it shall have failed")),
            Err(err) => Ok(err.kind),
        }
    }
}

/// A user walking through the ticket lifecycle
///
/// Tracks the seat the passenger believes to hold.
pub struct Passenger<'a> {
    pub api: &'a Api,
    pub user: User,
    pub seat: Option<SeatId>,
}

impl<'a> Passenger<'a> {
    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub async fn purchase(&mut self, from: &str, to: &str) -> Result<ApiResponse<Ticket>> {
        let request = PurchaseRequest::new(from, to, self.user.clone());
        let response = self.api.purchase_ticket(&request).await?;
        if let Ok(ticket) = &response.result {
            self.seat = Some(ticket.seat);
        }
        Ok(response)
    }

    pub async fn ticket(&self) -> Result<ApiResponse<Ticket>> {
        self.api.get_ticket(self.email()).await
    }

    pub async fn change_seat(&mut self, new_seat: SeatId) -> Result<ApiResponse<bool>> {
        let response = self
            .api
            .modify_seat(self.email(), &new_seat.to_string())
            .await?;
        if response.result.is_ok() {
            self.seat = Some(new_seat);
        }
        Ok(response)
    }

    pub async fn cancel(&mut self) -> Result<ApiResponse<bool>> {
        let response = self.api.remove_user(self.email()).await?;
        if response.result.is_ok() {
            self.seat = None;
        }
        Ok(response)
    }
}
