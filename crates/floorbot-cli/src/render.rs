//! Renderer task: periodic floor snapshots to the terminal.
//!
//! The renderer never touches floor internals; it polls
//! [`Scheduler::snapshot`] on its own cadence and either redraws an ANSI
//! screen or emits each snapshot as one JSON line.

use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use floorbot_core::{BotActivity, BotStatusView, FloorSnapshot, OrderView, Scheduler};
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, error};

/// How the renderer writes snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Clear and redraw the terminal every interval.
    Screen,
    /// One JSON object per snapshot, one per line.
    JsonLines,
}

/// Formats one order for the pending/completed sections.
pub fn format_order_line(order: &OrderView) -> String {
    format!("Order {} ({})", order.id, order.class)
}

/// Formats one bot-status line.
pub fn format_bot_line(bot: &BotStatusView) -> String {
    match bot.activity {
        BotActivity::Idle => format!("Bot {}: Idle", bot.id),
        BotActivity::Processing {
            order_id,
            class,
            seconds_left,
        } => format!(
            "Bot {}: Processing Order {} ({}) - {}s left",
            bot.id, order_id, class, seconds_left
        ),
    }
}

/// Renders the full screen: clear sequence plus the three floor sections.
pub fn format_screen(snapshot: &FloorSnapshot) -> String {
    let mut out = String::new();
    out.push_str("\x1b[2J\x1b[H");

    let _ = writeln!(
        out,
        "ORDER FLOOR  {}",
        snapshot.timestamp.format("%H:%M:%S")
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "=== PENDING ORDERS ({}) ===", snapshot.pending.len());
    if snapshot.pending.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for order in &snapshot.pending {
        let _ = writeln!(out, "  {}", format_order_line(order));
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "=== COMPLETED ORDERS ({}) ===",
        snapshot.completed.len()
    );
    if snapshot.completed.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for order in &snapshot.completed {
        let _ = writeln!(out, "  {}", format_order_line(order));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "=== BOT STATUS ({}) ===", snapshot.bots.len());
    if snapshot.bots.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for bot in &snapshot.bots {
        let _ = writeln!(out, "  {}", format_bot_line(bot));
    }
    let _ = writeln!(out);
    out.push_str("> ");

    out
}

/// Spawns the renderer task. It redraws on every interval tick and exits on
/// the shutdown broadcast.
pub fn spawn_renderer(
    scheduler: Arc<Scheduler>,
    redraw_interval: Duration,
    mode: RenderMode,
    shutdown_tx: &broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        let mut ticker = interval(redraw_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = scheduler.snapshot();
                    match mode {
                        RenderMode::Screen => {
                            let mut stdout = std::io::stdout();
                            let _ = stdout.write_all(format_screen(&snapshot).as_bytes());
                            let _ = stdout.flush();
                        }
                        RenderMode::JsonLines => match serde_json::to_string(&snapshot) {
                            Ok(line) => println!("{}", line),
                            Err(e) => error!(error = %e, "failed to serialize snapshot"),
                        },
                    }
                }
                _ = shutdown_rx.recv() => {
                    debug!("renderer shutting down");
                    break;
                }
            }
        }
    })
}
