// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Regeneration daemon (regend)
//!
//! Background process that polls configured resources and regenerates their
//! artifacts once edits settle.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod lifecycle;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use regen_core::SchedulerEvent;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::{Config, DEFAULT_CONFIG};
use crate::lifecycle::LifecycleError;

#[derive(Parser, Debug)]
#[command(
    name = "regend",
    version,
    about = "Regenerates derived artifacts once their sources stop changing"
)]
struct Args {
    /// Path to the configuration file
    #[arg(long, short, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Validate the configuration, list resources, and exit
    #[arg(long)]
    check: bool,

    /// Log to stderr instead of the log file
    #[arg(long)]
    foreground: bool,

    /// Print scheduler events to stdout as JSON lines
    #[arg(long)]
    events: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if args.check {
        print_check(&args.config, &config);
        return Ok(());
    }

    let _log_guard = setup_logging(&config, args.foreground)?;

    info!("Starting regend with config {}", args.config.display());

    let daemon = match lifecycle::startup(&config) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };
    let mut events = args.events.then(|| daemon.registry.subscribe());

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // First tick is immediate, so startup observes everything once
    let mut ticker = tokio::time::interval(daemon.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Daemon ready, watching {} resource(s)", config.resources.len());
    println!("READY");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = daemon.poll().await;
                debug!(?summary, "poll complete");
            }

            Some(event) = next_event(&mut events) => {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(error = %e, "failed to encode event"),
                }
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    daemon.shutdown();
    info!("Daemon stopped");
    Ok(())
}

/// Next event for `--events`; never resolves when streaming is off
async fn next_event(
    events: &mut Option<broadcast::Receiver<SchedulerEvent>>,
) -> Option<SchedulerEvent> {
    let Some(rx) = events.as_mut() else {
        return std::future::pending().await;
    };

    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
            Err(RecvError::Closed) => return None,
        }
    }
}

fn print_check(path: &Path, config: &Config) {
    println!("config ok: {}", path.display());
    println!(
        "debounce: {}",
        humantime::format_duration(config.scheduler.debounce)
    );
    for resource in &config.resources {
        println!("resource: {}", resource.id);
    }
}

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- regend: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- regend: starting (pid: ";

/// Append the startup marker to the log file
fn write_startup_marker(log_path: &Path) -> Result<(), LifecycleError> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

fn setup_logging(
    config: &Config,
    foreground: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if foreground {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    }

    let log_path = config.log_path()?;
    let log_dir = log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(log_dir)?;
    write_startup_marker(&log_path)?;

    // Set up file appender
    let file_appender = tracing_appender::rolling::never(
        log_dir,
        log_path.file_name().ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(Some(guard))
}
