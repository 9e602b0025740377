//! Reservation server: serves the reservation engine over HTTP

#![warn(missing_docs)]

mod http;

use std::thread;

use eyre::{eyre, Result, WrapErr};
use reservation_core::{Config, RequestHandler};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line options
#[derive(Debug)]
struct Opts {
    /// Configuration of the reservation service
    config: Config,

    /// Port for the HTTP server to listen on
    port: u16,
    /// Host for the HTTP server to listen on
    host: String,
    /// Number of request handler threads
    handler_threads: u32,

    /// Use the single-lock engine instead of the serializer 🔒
    locked: bool,
}

impl Opts {
    fn from_args() -> Result<Self> {
        let mut opts = Opts {
            port: 50051,
            host: String::from("127.0.0.1"),
            config: Config::default(),
            handler_threads: 8,
            locked: false,
        };

        let mut option: Option<String> = None;
        for arg in std::env::args().skip(1) {
            if let Some(opt) = option {
                match opt.as_str() {
                    "-port" => opts.port = arg.parse::<u16>().wrap_err("-port takes a decimal u16")?,
                    "-host" => opts.host = arg,
                    "-sections" => opts.config.sections = arg.chars().collect(),
                    "-seats-per-section" => {
                        opts.config.seats_per_section = arg
                            .parse::<u32>()
                            .wrap_err("-seats-per-section takes a decimal u32")?
                    }
                    "-price" => {
                        opts.config.price = arg.parse::<u32>().wrap_err("-price takes a decimal u32")?
                    }
                    "-queue-capacity" => {
                        opts.config.queue_capacity = arg
                            .parse::<usize>()
                            .wrap_err("-queue-capacity takes a decimal usize")?
                    }
                    "-handler-threads" => {
                        opts.handler_threads = arg
                            .parse::<u32>()
                            .wrap_err("-handler-threads takes a decimal u32")?
                    }
                    _ => return Err(eyre!("unknown option {opt}")),
                }
                option = None;
            } else {
                match arg.as_str() {
                    "-locked" => opts.locked = true,
                    _ => option = Some(arg),
                }
            }
        }
        if let Some(opt) = option {
            return Err(eyre!("leftover option {opt}"));
        }
        if opts.handler_threads == 0 {
            return Err(eyre!("-handler-threads must be positive"));
        }
        opts.config
            .validate()
            .wrap_err("invalid -sections")?;

        Ok(opts)
    }
}

fn http_loop<H: RequestHandler>(server: &tiny_http::Server, handler: &H) {
    // `recv` fails once the listener is gone
    while let Ok(rq) = server.recv() {
        if let Some(rq) = http::parse(rq) {
            handler.handle(rq);
        }
    }
}

fn serve<H: RequestHandler + Sync>(server: &tiny_http::Server, handler: H, threads: u32) -> Result<()> {
    thread::scope(|s| -> Result<()> {
        for i in 0..threads {
            thread::Builder::new()
                .name(format!("handler_{i}"))
                .spawn_scoped(s, || http_loop(server, &handler))?;
        }
        Ok(())
    })?;
    handler.shutdown();
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reservation_server=info,reservation_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = Opts::from_args()?;

    let server = tiny_http::Server::http((opts.host.as_str(), opts.port))
        .map_err(|e| eyre!("cannot listen on {}:{}: {e}", opts.host, opts.port))?;
    info!(host = %opts.host, port = opts.port, locked = opts.locked, "listening");

    if opts.locked {
        serve(&server, reservation_engine::launch_locked(&opts.config)?, opts.handler_threads)
    } else {
        serve(&server, reservation_engine::launch(&opts.config)?, opts.handler_threads)
    }
}
