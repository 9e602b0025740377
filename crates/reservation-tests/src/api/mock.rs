//! Mock API implementation directly using the `reservation-engine` crate

use std::sync::Arc;

use reservation_core::{ErrorKind, RawRequest, Request, RequestHandler, RequestKind};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use uuid::Uuid;

use super::{Api, RequestMsg, Response};

pub struct MockGateway<H> {
    handler: Arc<H>,
    join_handles: Vec<JoinHandle<()>>,
}

struct MockRawRequest {
    payload: Option<String>,
    kind: RequestKind,
    response_channel: oneshot::Sender<Response>,
}

pub fn start<H>(threads: u16, handler: H) -> (MockGateway<H>, Api)
where
    H: RequestHandler + Send + Sync + 'static,
{
    let handler = Arc::new(handler);

    let it = (0..threads).map(|_| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let handler = handler.clone();
        let handle = task::spawn_blocking(move || {
            let handler = &*handler;
            for msg in receiver.into_iter() {
                let raw = Box::new(MockRawRequest {
                    payload: Some(msg.payload),
                    kind: msg.kind,
                    response_channel: msg.response_channel,
                });
                handler.handle(Request::from_raw(msg.kind, msg.request_id, raw))
            }
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let mock_gateway = MockGateway {
        handler,
        join_handles,
    };
    (mock_gateway, Api::new(senders))
}

impl<H> MockGateway<H>
where
    H: RequestHandler + Send + Sync + 'static,
{
    /// Wait for the handler threads, then shut the engine down
    ///
    /// Every [`Api`] clone must have been dropped, otherwise this waits forever.
    pub async fn shutdown(self) {
        for handle in self.join_handles {
            handle.await.unwrap()
        }
        let handler = Arc::into_inner(self.handler).unwrap();
        task::spawn_blocking(move || handler.shutdown())
            .await
            .unwrap();
    }
}

impl RawRequest for MockRawRequest {
    fn url(&self) -> &str {
        use RequestKind::*;
        match self.kind {
            PurchaseTicket => "/api/purchase_ticket",
            GetTicket => "/api/get_ticket",
            GetSeatsBySection => "/api/get_seats_by_section",
            RemoveUser => "/api/remove_user",
            ModifySeat => "/api/modify_seat",
            Debug => "/api/debug",
        }
    }

    fn method(&self) -> reservation_core::RequestMethod {
        reservation_core::RequestMethod::Post
    }

    fn read_string(&mut self) -> std::io::Result<String> {
        Ok(self.payload.take().unwrap_or_default())
    }

    fn respond_with_err(self: Box<Self>, kind: ErrorKind, msg: String, request_id: Uuid) {
        let response = Response::Error {
            kind,
            msg,
            request_id,
        };
        self.response_channel.send(response).unwrap()
    }

    fn respond_with_json(self: Box<Self>, body: String, request_id: Uuid) {
        let response = Response::Json { body, request_id };
        self.response_channel.send(response).unwrap()
    }
}
