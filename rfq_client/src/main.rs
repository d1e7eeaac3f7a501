//! RFQ desk client. Joins the RFQ feed over TCP, keeps the shared queue in sync,
//! and lets the desk claim, release and price RFQs from the console.
//!
//! Usage example (CLI):
//! ```bash
//! rfq_client --server-ip 192.168.0.10 --bootstrap ./live_rfqs.json
//! ```
//!
//! Console commands: `claim <id>`, `release`, `price <id> <value>`, `show <id>`,
//! `queue`, `quit`.
//!
//! Threads:
//! - feed reader — forwards each JSON line from the socket,
//! - feed writer — sends outbound `client_update` envelopes,
//! - console — parses stdin commands,
//! - main — the only thread touching the `Session`; it multiplexes the above
//!   with `select!` and renders view events after each step.
#![warn(missing_docs)]
mod args;
mod command;
mod link;
mod render;

use crate::args::Args;
use crate::command::UserCommand;
use crate::link::{FeedLink, Input, spawn_console};
use crate::render::LogRenderer;
use clap::Parser;
use crossbeam_channel::{select, tick, unbounded};
use log::{error, info, warn};
use rfq_client::Session;
use rfq_common::net::addr;
use rfq_common::{Result, RfqError};
use std::fs::File;
use std::io::BufReader;
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

/// How often the main loop checks the Ctrl+C flag.
const SHUTDOWN_POLL_MS: u64 = 250;

fn main() -> Result<(), RfqError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| RfqError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let (outbound_tx, outbound_rx) = unbounded();
    let (view_tx, view_rx) = unbounded();
    let mut session = Session::new(outbound_tx, view_tx);
    let renderer = LogRenderer::new(args.history_days);

    if let Some(path) = args.bootstrap.as_deref() {
        let file = File::open(normalize_path(path))?;
        session.bootstrap(BufReader::new(file))?;
        renderer.drain(&session, &view_rx);
    }

    let server_address = addr(args.server_ip.trim(), args.port);
    info!("Connecting to RFQ feed at {}", server_address);
    let stream = TcpStream::connect(&server_address)
        .map_err(|e| RfqError::Format(format!("Failed to connect to feed: {}", e)))?;
    session.connected();

    let (input_tx, input_rx) = unbounded::<Input>();
    FeedLink::spawn_reader(stream.try_clone()?, input_tx.clone());
    let writer = FeedLink::spawn_writer(stream, outbound_rx);
    spawn_console(input_tx);

    info!("Client is running. Type `queue` to list RFQs, Ctrl+C to exit.");
    let ticker = tick(Duration::from_millis(SHUTDOWN_POLL_MS));
    loop {
        select! {
            recv(input_rx) -> input => match input {
                Ok(Input::Line(line)) => {
                    session.handle_raw(&line);
                }
                Ok(Input::Closed) => session.disconnected(),
                Ok(Input::Command(UserCommand::Quit)) => break,
                Ok(Input::Command(command)) => run_command(&mut session, &renderer, command),
                Err(_) => {
                    info!("Feed and console are both closed");
                    break;
                }
            },
            recv(ticker) -> _ => if shutdown.load(Ordering::Relaxed) {
                break;
            },
        }
        renderer.drain(&session, &view_rx);
    }

    session.release();
    renderer.drain(&session, &view_rx);
    drop(session);
    if writer.join().is_err() {
        error!("Writer thread panicked");
    }
    info!("Client stopped.");
    Ok(())
}

fn run_command(session: &mut Session, renderer: &LogRenderer, command: UserCommand) {
    let outcome = match command {
        UserCommand::Claim(id) => session.claim(&id),
        UserCommand::Release => {
            session.release();
            Ok(())
        }
        UserCommand::Price(id, price) => session.submit_price(&id, price),
        UserCommand::Show(id) => {
            renderer.show_detail(session, &id);
            Ok(())
        }
        UserCommand::Queue => {
            renderer.show_queue(session);
            Ok(())
        }
        UserCommand::Quit => Ok(()),
    };
    if let Err(e) = outcome {
        warn!("{}", e);
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
