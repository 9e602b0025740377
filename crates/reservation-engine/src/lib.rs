//! 🚆 The reservation engine.
//!
//! All reservation state lives in one [`Store`](store::Store) that is only
//! ever touched by one operation at a time. Two engines provide that
//! guarantee: the [`Serializer`], where a dedicated worker thread owns the
//! store and callers submit operations through a queue, and [`Locked`], where
//! the store sits behind a single mutex. The [`Gateway`] serves transport
//! requests with either of them.

#![allow(rustdoc::private_intra_doc_links)]
use reservation_core::{Config, Reservations, Result};
use tracing::info;

mod allocator;
mod gateway;
mod locked;
mod serializer;
mod store;

pub use gateway::Gateway;
pub use locked::Locked;
pub use serializer::{Serializer, SerializerHandle};

/// A service executing the reservation operations one at a time
pub trait Engine: Reservations + Send + Sync {
    /// Name reported in logs and debug responses
    const NAME: &'static str;

    /// Stop the engine, answering every operation accepted so far
    fn stop(self);
}

impl Engine for Serializer {
    const NAME: &'static str = "serializer";

    fn stop(self) {
        self.shutdown();
    }
}

impl Engine for Locked {
    const NAME: &'static str = "locked";

    fn stop(self) {
        // nothing to do
    }
}

/// Entrypoint of the reservation engine
///
/// Starts the [`Serializer`] worker and wraps it in a [`Gateway`] to be served
/// requests by the surrounding infrastructure.
pub fn launch(config: &Config) -> Result<Gateway<Serializer>> {
    let serializer = Serializer::spawn(config)?;
    info!(engine = Serializer::NAME, seats = config.capacity(), "launched");
    Ok(Gateway::new(serializer))
}

/// Entrypoint for the single-lock engine
pub fn launch_locked(config: &Config) -> Result<Gateway<Locked>> {
    let locked = Locked::new(config)?;
    info!(engine = Locked::NAME, seats = config.capacity(), "launched");
    Ok(Gateway::new(locked))
}
