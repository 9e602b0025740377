//! Implementation of the serializer: one worker thread owning the [`Store`]
//!
//! Callers submit an [`Operation`] together with a reply channel and block
//! until the worker answers. The worker executes operations strictly one at a
//! time in the order they were accepted into the queue.
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use reservation_core::{
    Config, PurchaseRequest, ReservationError, Reservations, Result, SeatMap, Ticket,
};
use tracing::{debug, info};

use crate::store::Store;

type Reply<T> = Sender<Result<T>>;

/// Operations understood by the worker
///
/// Each carries the sender its result is answered on.
pub(crate) enum Operation {
    /// See [`Store::purchase`]
    Purchase {
        request: PurchaseRequest,
        reply: Reply<Ticket>,
    },
    /// See [`Store::ticket`]
    GetTicket {
        email: String,
        reply: Reply<Ticket>,
    },
    /// See [`Store::seats_by_section`]
    GetSeatsBySection {
        section: char,
        reply: Reply<SeatMap>,
    },
    /// See [`Store::remove`]
    RemoveUser {
        email: String,
        reply: Reply<()>,
    },
    /// See [`Store::modify_seat`]
    ModifySeat {
        email: String,
        new_seat: String,
        reply: Reply<()>,
    },
    /// Stop the worker once everything queued before has been answered
    Shutdown,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Purchase { .. } => "purchase_ticket",
            Operation::GetTicket { .. } => "get_ticket",
            Operation::GetSeatsBySection { .. } => "get_seats_by_section",
            Operation::RemoveUser { .. } => "remove_user",
            Operation::ModifySeat { .. } => "modify_seat",
            Operation::Shutdown => "shutdown",
        }
    }
}

/// The worker owning the reservation state
struct Worker {
    store: Store,
    operations: Receiver<Operation>,
}

impl Worker {
    /// main worker loop
    fn run(mut self) {
        while let Ok(op) = self.operations.recv() {
            debug!(operation = op.name(), "executing");
            match op {
                Operation::Purchase { request, reply } => {
                    let _ = reply.send(self.store.purchase(request));
                }
                Operation::GetTicket { email, reply } => {
                    let _ = reply.send(self.store.ticket(&email));
                }
                Operation::GetSeatsBySection { section, reply } => {
                    let _ = reply.send(Ok(self.store.seats_by_section(section)));
                }
                Operation::RemoveUser { email, reply } => {
                    let _ = reply.send(self.store.remove(&email));
                }
                Operation::ModifySeat {
                    email,
                    new_seat,
                    reply,
                } => {
                    let _ = reply.send(self.store.modify_seat(&email, &new_seat));
                }
                Operation::Shutdown => break,
            }
        }
        info!(
            tickets = self.store.num_tickets(),
            "reservation worker stopped"
        );
        // dropping the receiver fails every operation still queued
    }
}

/// Handle for submitting operations to the worker
///
/// Cheap to clone. Once the worker has stopped, every call fails with
/// [`ReservationError::ServiceUnavailable`].
#[derive(Clone)]
pub struct SerializerHandle {
    operations: Sender<Operation>,
}

impl SerializerHandle {
    /// Enqueue an operation and block until its result arrives
    ///
    /// Blocks while the queue is full.
    fn submit<T>(&self, make: impl FnOnce(Reply<T>) -> Operation) -> Result<T> {
        let (reply, result) = channel::bounded(1);
        self.operations
            .send(make(reply))
            .map_err(|_| ReservationError::ServiceUnavailable)?;
        result
            .recv()
            .map_err(|_| ReservationError::ServiceUnavailable)?
    }
}

impl Reservations for SerializerHandle {
    fn purchase_ticket(&self, request: PurchaseRequest) -> Result<Ticket> {
        self.submit(|reply| Operation::Purchase { request, reply })
    }

    fn get_ticket(&self, email: &str) -> Result<Ticket> {
        let email = email.to_owned();
        self.submit(|reply| Operation::GetTicket { email, reply })
    }

    fn get_seats_by_section(&self, section: char) -> Result<SeatMap> {
        self.submit(|reply| Operation::GetSeatsBySection { section, reply })
    }

    fn remove_user(&self, email: &str) -> Result<()> {
        let email = email.to_owned();
        self.submit(|reply| Operation::RemoveUser { email, reply })
    }

    fn modify_seat(&self, email: &str, new_seat: &str) -> Result<()> {
        let email = email.to_owned();
        let new_seat = new_seat.to_owned();
        self.submit(|reply| Operation::ModifySeat {
            email,
            new_seat,
            reply,
        })
    }
}

/// Reservation service backed by a dedicated worker thread
pub struct Serializer {
    handle: SerializerHandle,
    worker: JoinHandle<()>,
}

impl Serializer {
    /// Start the worker for a train described by `config`
    pub fn spawn(config: &Config) -> Result<Self> {
        let store = Store::new(config)?;
        let (sender, receiver) = if config.queue_capacity == 0 {
            channel::unbounded()
        } else {
            channel::bounded(config.queue_capacity)
        };

        info!(
            seats = store.capacity(),
            queue_capacity = config.queue_capacity,
            "starting reservation worker"
        );
        let worker = Worker {
            store,
            operations: receiver,
        };
        let worker = thread::Builder::new()
            .name("reservation-serializer".into())
            .spawn(move || worker.run())
            .map_err(|_| ReservationError::ServiceUnavailable)?;

        Ok(Self {
            handle: SerializerHandle { operations: sender },
            worker,
        })
    }

    /// Get a handle for submitting operations from other threads
    pub fn handle(&self) -> SerializerHandle {
        self.handle.clone()
    }

    /// Stop the worker
    ///
    /// Operations accepted before this call are executed and answered first.
    pub fn shutdown(self) {
        let _ = self.handle.operations.send(Operation::Shutdown);
        let _ = self.worker.join();
    }
}

impl Reservations for Serializer {
    fn purchase_ticket(&self, request: PurchaseRequest) -> Result<Ticket> {
        self.handle.purchase_ticket(request)
    }

    fn get_ticket(&self, email: &str) -> Result<Ticket> {
        self.handle.get_ticket(email)
    }

    fn get_seats_by_section(&self, section: char) -> Result<SeatMap> {
        self.handle.get_seats_by_section(section)
    }

    fn remove_user(&self, email: &str) -> Result<()> {
        self.handle.remove_user(email)
    }

    fn modify_seat(&self, email: &str, new_seat: &str) -> Result<()> {
        self.handle.modify_seat(email, new_seat)
    }
}
