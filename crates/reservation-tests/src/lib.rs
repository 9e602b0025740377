use eyre::Result;
use reservation_core::Config;
use reservation_engine::{Locked, Serializer};
use settings::TestSettings;

mod api;
mod settings;
pub use api::{Api, ApiError, ApiResponse, Passenger};
pub use settings::EngineKind;

pub struct TestCtxBuilder {
    /// Engine serving the requests
    pub engine: EngineKind,
    /// Section codes of the train
    pub sections: Vec<char>,
    /// Seats in every section
    pub seats_per_section: u32,
    /// Price of every ticket
    pub price: u32,
    /// Capacity of the serializer's queue
    pub queue_capacity: usize,
    /// Count of request handler threads
    pub handler_threads: u16,
}

impl TestCtxBuilder {
    /// Create a new test context builder initialized with environment defaults
    pub fn from_env() -> Result<Self> {
        let settings = TestSettings::load()?;
        let config = Config::default();

        Ok(TestCtxBuilder {
            engine: settings.engine,
            sections: config.sections,
            seats_per_section: config.seats_per_section,
            price: config.price,
            queue_capacity: config.queue_capacity,
            handler_threads: settings.handler_threads.unwrap_or(4),
        })
    }

    /// Set the section codes
    pub fn with_sections(mut self, sections: &str) -> Self {
        self.sections = sections.chars().collect();
        self
    }

    /// Set the number of seats in every section
    pub fn with_seats_per_section(mut self, seats: u32) -> Self {
        self.seats_per_section = seats;
        self
    }

    /// Set the capacity of the serializer's queue (`0` for unbounded)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the number of request handler threads to use
    pub fn with_handler_threads(mut self, threads: u16) -> Self {
        assert_ne!(threads, 0);
        self.handler_threads = threads;
        self
    }

    /// Select the engine
    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    /// Get the [`reservation_core::Config`] for launching the engine
    fn config(&self) -> Config {
        Config {
            sections: self.sections.clone(),
            seats_per_section: self.seats_per_section,
            price: self.price,
            queue_capacity: self.queue_capacity,
        }
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let config = self.config();
        let (gateway, api) = match self.engine {
            EngineKind::Serializer => {
                let launched =
                    tokio::task::spawn_blocking(move || reservation_engine::launch(&config))
                        .await??;
                let (gateway, api) = api::mock::start(self.handler_threads, launched);
                (Gateway::Serializer(gateway), api)
            }
            EngineKind::Locked => {
                let launched = reservation_engine::launch_locked(&config)?;
                let (gateway, api) = api::mock::start(self.handler_threads, launched);
                (Gateway::Locked(gateway), api)
            }
        };

        Ok(TestCtx {
            api,
            gateway,
            engine: self.engine,
            sections: self.sections,
            seats_per_section: self.seats_per_section,
            price: self.price,
            drop_bomb: DropBomb,
        })
    }
}

enum Gateway {
    Serializer(api::mock::MockGateway<reservation_engine::Gateway<Serializer>>),
    Locked(api::mock::MockGateway<reservation_engine::Gateway<Locked>>),
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the reservation service
    pub api: Api,
    gateway: Gateway,
    /// Engine serving the requests
    pub engine: EngineKind,
    /// Section codes of the train
    pub sections: Vec<char>,
    /// Seats in every section
    pub seats_per_section: u32,
    /// Price of every ticket
    pub price: u32,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Total number of seats
    pub fn capacity(&self) -> usize {
        self.sections.len() * self.seats_per_section as usize
    }

    /// Shut the reservation service down and finish the test
    pub async fn finish(self) {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        match self.gateway {
            Gateway::Serializer(g) => g.shutdown().await,
            Gateway::Locked(g) => g.shutdown().await,
        }
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to shut the reservation service down");
    }
}
