//! Checkpoint Demo Application
//!
//! Runs one checkpoint in the terminal. Cards are "presented" by typing
//! commands:
//! - `in <id>` / `out <id>` - scan a card on the entry or exit lane
//! - `who` - list everyone inside
//! - `log` - dump the event log
//! - `quit` - exit

mod console;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use checkpoint_core::Lane;
use checkpoint_runtime::{init_tracing, Checkpoint, CheckpointConfig, CheckpointService, Peripherals};
use checkpoint_time::SystemClock;

use console::{ConsoleDiagnostics, ConsoleDisplay, ConsoleFeedback};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("checkpoint=info");

    let config = match std::env::args().nth(1) {
        Some(path) => CheckpointConfig::load(&path)?,
        None => CheckpointConfig::demo(),
    };
    info!(credentials = config.credentials.len(), "configuration loaded");

    let clock = Arc::new(SystemClock);
    let io = Peripherals {
        clock: Box::new(clock.clone()),
        presenter: Box::new(ConsoleDisplay),
        feedback: Box::new(ConsoleFeedback),
        diagnostics: Box::new(ConsoleDiagnostics),
    };
    let refresh_every = config.poll_interval().max(Duration::from_millis(100));
    let checkpoint = Checkpoint::new(config, io)?;
    let service = CheckpointService::spawn(checkpoint, clock, refresh_every);

    println!("Commands: in <id>, out <id>, who, log, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            prompt()?;
            continue;
        };
        let arg = parts.next();

        match cmd {
            "quit" | "q" => break,
            "who" => {
                let inside = service.occupancy().await?;
                if inside.is_empty() {
                    println!("Nobody inside");
                }
                for occupant in inside {
                    println!("  {:<12} since {}", occupant.name, occupant.entered_at);
                }
            }
            "log" => {
                if service.dump_log().await?.is_empty() {
                    println!("Log is empty");
                }
            }
            _ => match (cmd.parse::<Lane>(), arg) {
                (Ok(lane), Some(id)) => service.scan(lane, id).await?,
                (Ok(_), None) => println!("Usage: {cmd} <card id>"),
                (Err(_), _) => println!("Unknown command: {cmd}"),
            },
        }
        prompt()?;
    }

    let checkpoint = service.shutdown().await?;
    let stats = checkpoint.stats();
    info!(
        accepted = stats.scans_accepted,
        dropped = stats.scans_dropped,
        entries = stats.entries,
        exits = stats.exits,
        "session ended"
    );
    if checkpoint.is_degraded() {
        warn!("ran without a real-time clock; log timestamps count from 1970-01-01");
    }
    println!("Goodbye!");
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}
