//! QuakeAware - earthquake monitoring and predictive risk dashboard.
//!
//! A single binary that serves an interactive earthquake dashboard
//! (map, list panels, probabilistic risk predictions) or tails recent
//! events straight to the terminal.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use quakeaware::cli::{Cli, Command, ServeArgs, TailArgs};
use quakeaware::client::UsgsClient;
use quakeaware::output;
use quakeaware::server::{self, ServerConfig};
use quakeaware::sources::{DataSources, RecentQuery};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Tail(args) => cmd_tail(args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `serve` command - start the dashboard server.
fn cmd_serve(args: ServeArgs) -> Result<()> {
    // Validate poll interval
    let poll_interval = args.poll_interval.max(30);
    if poll_interval != args.poll_interval {
        tracing::warn!("poll interval clamped to minimum of 30 seconds");
    }

    let config = ServerConfig {
        port: args.port,
        host: args.host.clone(),
        query: RecentQuery {
            min_magnitude: args.min_magnitude,
            period: args.period,
            limit: args.limit,
        },
        poll_interval,
    };

    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1mQuakeAware Dashboard\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    M{}+ / {}", args.min_magnitude, args.period.as_str());
    println!("  Poll:    {poll_interval}s");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}

/// Execute the `tail` command - one-shot fetch of recent earthquakes.
fn cmd_tail(args: TailArgs) -> Result<()> {
    let client = UsgsClient::new().context("failed to create USGS client")?;
    let sources = DataSources::new(client);

    let query = RecentQuery {
        min_magnitude: args.min_magnitude,
        period: args.period,
        limit: args.limit,
    };

    let events = tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(sources.recent_earthquakes(query));

    // Write output
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &events, args.format)?;
    handle.flush()?;

    Ok(())
}
