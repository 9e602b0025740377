//! Command line client for the reservation server

use eyre::{bail, eyre, Result};
use reservation_core::{
    GetSeatsBySectionRequest, GetTicketRequest, ModifySeatRequest, PurchaseRequest,
    RemoveUserRequest, User,
};
use serde::Serialize;

const USAGE: &str = "usage: reservation-client -cmd <purchase|getticket|getseats|removeuser|modifyseat>
    [-from <station>] [-to <station>] [-email <email>]
    [-first-name <name>] [-last-name <name>]
    [-section <letter>] [-newseat <seat>] [-addr <host:port>]";

/// Command line options
#[derive(Debug, Default)]
struct Opts {
    cmd: String,
    from: String,
    to: String,
    email: String,
    first_name: String,
    last_name: String,
    section: String,
    new_seat: String,
    addr: String,
}

impl Opts {
    fn from_args() -> Result<Self> {
        let mut opts = Opts {
            addr: String::from("127.0.0.1:50051"),
            ..Opts::default()
        };

        let mut args = std::env::args().skip(1);
        while let Some(opt) = args.next() {
            let value = args
                .next()
                .ok_or_else(|| eyre!("option {opt} takes a value"))?;
            match opt.as_str() {
                "-cmd" => opts.cmd = value,
                "-from" => opts.from = value,
                "-to" => opts.to = value,
                "-email" => opts.email = value,
                "-first-name" => opts.first_name = value,
                "-last-name" => opts.last_name = value,
                "-section" => opts.section = value,
                "-newseat" => opts.new_seat = value,
                "-addr" => opts.addr = value,
                _ => bail!("unknown option {opt}"),
            }
        }
        opts.validate()?;
        Ok(opts)
    }

    /// Check that the flags required by the command are present
    fn validate(&self) -> Result<()> {
        let required = match self.cmd.as_str() {
            "purchase" => vec![
                ("-from", &self.from),
                ("-to", &self.to),
                ("-email", &self.email),
            ],
            "getticket" | "removeuser" => vec![("-email", &self.email)],
            "getseats" => vec![("-section", &self.section)],
            "modifyseat" => vec![("-email", &self.email), ("-newseat", &self.new_seat)],
            "" => bail!("-cmd is required"),
            cmd => bail!("unknown command {cmd}"),
        };
        for (flag, value) in required {
            if value.is_empty() {
                bail!("{flag} is required for {}", self.cmd);
            }
        }
        Ok(())
    }
}

fn post<T: Serialize>(client: &reqwest::blocking::Client, addr: &str, path: &str, body: &T) -> Result<()> {
    let response = client
        .post(format!("http://{addr}/api/{path}"))
        .json(body)
        .send()?;
    let status = response.status();
    let text = response.text()?;
    if status.is_success() {
        println!("{text}");
        Ok(())
    } else {
        Err(eyre!("{status}: {text}"))
    }
}

fn main() -> Result<()> {
    let opts = match Opts::from_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(1);
        }
    };
    let client = reqwest::blocking::Client::new();
    let addr = opts.addr.as_str();

    match opts.cmd.as_str() {
        "purchase" => post(
            &client,
            addr,
            "purchase_ticket",
            &PurchaseRequest::new(
                opts.from,
                opts.to,
                User::new(opts.email, opts.first_name, opts.last_name),
            ),
        ),
        "getticket" => post(
            &client,
            addr,
            "get_ticket",
            &GetTicketRequest { email: opts.email },
        ),
        "getseats" => post(
            &client,
            addr,
            "get_seats_by_section",
            &GetSeatsBySectionRequest {
                section: opts.section,
            },
        ),
        "removeuser" => post(
            &client,
            addr,
            "remove_user",
            &RemoveUserRequest { email: opts.email },
        ),
        "modifyseat" => post(
            &client,
            addr,
            "modify_seat",
            &ModifySeatRequest {
                email: opts.email,
                new_seat: opts.new_seat,
            },
        ),
        cmd => Err(eyre!("unknown command {cmd}")),
    }
}
