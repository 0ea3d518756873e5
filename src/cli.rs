//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Parser, Subcommand};

use crate::client::FeedPeriod;
use crate::output::Format;

/// Earthquake monitoring and predictive risk dashboard.
#[derive(Parser, Debug)]
#[command(name = "quakeaware")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the dashboard web server
    Serve(ServeArgs),

    /// Show recent earthquakes (one-shot fetch and exit)
    Tail(TailArgs),
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Minimum magnitude for the summary feed
    #[arg(long, default_value = "4.5")]
    pub min_magnitude: f64,

    /// Feed period: hour, day, week or month
    #[arg(long, default_value = "month", value_parser = parse_period)]
    pub period: FeedPeriod,

    /// Maximum number of recent events to keep
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Poll interval in seconds (minimum 30)
    #[arg(long, default_value = "60")]
    pub poll_interval: u64,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `tail` command.
#[derive(Parser, Debug)]
pub struct TailArgs {
    /// Minimum magnitude for the summary feed
    #[arg(long, default_value = "4.5")]
    pub min_magnitude: f64,

    /// Feed period: hour, day, week or month
    #[arg(long, default_value = "month", value_parser = parse_period)]
    pub period: FeedPeriod,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse a feed period from string.
fn parse_period(s: &str) -> Result<FeedPeriod, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}
