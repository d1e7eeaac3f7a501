//! Command-line arguments for the RFQ desk client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use rfq_common::net::FEED_PORT;

/// Upper bound for `--history-days`, about a century.
pub const MAX_HISTORY_DAYS: u32 = 36_500;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Server IP address (IPv4 or IPv6) where the RFQ feed is running.
    #[clap(long)]
    pub server_ip: String,

    /// TCP port of the RFQ feed.
    #[clap(long, default_value_t = FEED_PORT)]
    pub port: u16,

    /// Path to a JSON array of live RFQs loaded before the feed is joined.
    #[clap(long)]
    pub bootstrap: Option<String>,

    /// How many days of history the detail view shows.
    #[clap(
        long,
        default_value_t = 30,
        value_parser = clap::value_parser!(u32).range(1..=MAX_HISTORY_DAYS as i64)
    )]
    pub history_days: u32,
}
