//! floorbot: interactive simulator for a priority order-fulfillment floor.
//!
//! Usage:
//!   floorbot [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>        Config file path (default: config/floorbot.toml)
//!   --bots <N>                 Bots to start with (overrides config)
//!   --log-level <LEVEL>        trace, debug, info, warn, error (overrides config)
//!   --render-interval-ms <MS>  Renderer redraw interval (overrides config)
//!   --json                     Emit snapshots as JSON lines instead of a screen

mod commands;
mod config;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use floorbot_core::{PoolError, Scheduler};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::commands::DriverCommand;
use crate::config::FloorbotConfig;
use crate::render::{RenderMode, spawn_renderer};

/// CLI arguments for floorbot.
#[derive(Parser, Debug)]
#[command(name = "floorbot")]
#[command(about = "Interactive priority order-fulfillment floor simulator")]
#[command(version)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config/floorbot.toml")]
    config: PathBuf,

    /// Number of bots to start with (overrides config file)
    #[arg(long)]
    bots: Option<usize>,

    /// Log level: trace, debug, info, warn, error (overrides config file)
    #[arg(long)]
    log_level: Option<String>,

    /// Renderer redraw interval in milliseconds (overrides config file)
    #[arg(long)]
    render_interval_ms: Option<u64>,

    /// Emit snapshots as JSON lines instead of redrawing the screen
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if it's not a "file not found" error
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let args = Args::parse();

    // Load configuration
    let (mut config, config_found) = if args.config.exists() {
        let loaded = FloorbotConfig::from_file(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;
        (loaded, true)
    } else {
        (FloorbotConfig::default(), false)
    };

    config.apply_env_overrides();
    config.apply_cli_overrides(
        args.log_level.clone(),
        args.bots,
        args.render_interval_ms,
        args.json,
    );

    // Initialize logging
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // In JSON mode stdout carries snapshots only; log to stderr instead.
    if config.render.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
        tracing::subscriber::set_global_default(subscriber)
    }
    .context("Failed to set global tracing subscriber")?;

    if !config_found {
        warn!(path = ?args.config, "config file not found, using defaults");
    }

    config.validate().context("Configuration validation failed")?;

    info!(
        bots = config.initial_bots,
        service_ticks = config.floor.service_ticks,
        tick_ms = config.floor.tick_ms,
        render_interval_ms = config.render.interval_ms,
        "starting floorbot"
    );

    // Build the floor and spawn the starting pool.
    let scheduler = Scheduler::shared(config.floor_config());
    for _ in 0..config.initial_bots {
        scheduler.add_worker().await;
    }

    // Renderer runs on its own cadence; the driver owns this task's loop.
    let (shutdown_tx, _) = broadcast::channel(1);
    let render_mode = if config.render.json {
        RenderMode::JsonLines
    } else {
        RenderMode::Screen
    };
    let renderer = spawn_renderer(
        Arc::clone(&scheduler),
        Duration::from_millis(config.render.interval_ms),
        render_mode,
        &shutdown_tx,
    );

    info!("{}", DriverCommand::usage());
    run_driver(&scheduler).await?;

    // Stop the bots first so in-flight work is requeued, then the renderer.
    scheduler.shutdown().await;
    let _ = shutdown_tx.send(());
    match tokio::time::timeout(Duration::from_secs(2), renderer).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "renderer task panicked"),
        Err(_) => warn!("renderer did not stop in time"),
    }

    info!(
        completed = scheduler.completed_count(),
        pending = scheduler.pending_count(),
        "floorbot exited"
    );
    Ok(())
}

/// Reads driver commands from stdin until `exit`, end of input, or Ctrl+C.
async fn run_driver(scheduler: &Scheduler) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    info!("input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<DriverCommand>() {
                    Ok(DriverCommand::NewOrder(class)) => {
                        scheduler.submit_order(class);
                    }
                    Ok(DriverCommand::AddBot) => {
                        scheduler.add_worker().await;
                    }
                    Ok(DriverCommand::RemoveBot) => {
                        if let Err(PoolError::NoWorkers) = scheduler.remove_worker().await {
                            warn!("no bots to remove");
                        }
                    }
                    Ok(DriverCommand::Help) => {
                        info!("{}", DriverCommand::usage());
                    }
                    Ok(DriverCommand::Exit) => {
                        info!("exit requested");
                        break;
                    }
                    Err(e) => {
                        warn!("{}; {}", e, DriverCommand::usage());
                    }
                }
            }
            _ = &mut ctrl_c => {
                info!("received Ctrl+C");
                break;
            }
        }
    }

    Ok(())
}
