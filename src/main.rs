//! Host shell for the App Open ad manager.
//!
//! Wires the manager to the simulated ad network and drives it from
//! stdin, so the lifecycle can be exercised without a device.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SimulatedProvider   QueueForegroundSource   SystemClock     │
//! │  (AdProvider)        (ForegroundSource)      (Clock)         │
//! │  LogEventSink (EventSink)                                    │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          AdLifecycleManager (pure logic)               │  │
//! │  │  FSM · Slot · Expiry · Throttle                        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  EventQueue (adapter callbacks) · Scheduler (first run)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stdin commands: `active`, `inactive`, `background`, `load`, `show`,
//! `close`, `stats`, `quit`.
#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use appopen::adapters::foreground::{ForegroundNotifier, QueueForegroundSource};
use appopen::adapters::log_sink::LogEventSink;
use appopen::adapters::simulated::SimulatedProvider;
use appopen::adapters::time::SystemClock;
use appopen::app::commands::AppCommand;
use appopen::app::ports::AppLifecycle;
use appopen::app::service::AdLifecycleManager;
use appopen::config::{AdConfig, Platform};
use appopen::events::EventQueue;

/// Main loop period.
const PUMP_INTERVAL: Duration = Duration::from_millis(100);

/// What the stdin reader hands to the main loop.
enum ShellCommand {
    App(AppCommand),
    /// User tapped close on the simulated ad.
    Dismiss,
    Stats,
    Quit,
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    init_logging();

    info!("╔══════════════════════════════════════╗");
    info!("║  appopen v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (JSON file or defaults) ─────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => {
            info!("No config file given, using defaults");
            AdConfig::default()
        }
    };
    info!("Ad unit: {}", config.ad_unit_id(Platform::current()));

    // ── 3. Construct adapters ─────────────────────────────────
    let queue = EventQueue::new();
    let provider = SimulatedProvider::new(queue.clone());
    let source = QueueForegroundSource::new();
    let notifier = source.notifier();
    let mut sink = LogEventSink::new();

    // ── 4. Manager ────────────────────────────────────────────
    let mut manager = AdLifecycleManager::new(config, provider, source, SystemClock::new(), queue);
    manager.start(&mut sink);

    // ── 5. Stdin reader ───────────────────────────────────────
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || read_commands(&notifier, &tx))
        .context("spawning stdin reader")?;

    // ── 6. Main loop ──────────────────────────────────────────
    info!("Entering main loop (type 'quit' to exit)");
    loop {
        if !drain_commands(&rx, &mut manager, &mut sink) {
            break;
        }
        manager.pump(&mut sink);
        std::thread::sleep(PUMP_INTERVAL);
    }

    manager.shutdown(&mut sink);
    info!("Shut down cleanly");
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("appopen=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load_config(path: &str) -> Result<AdConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config = AdConfig::from_json(&text).with_context(|| format!("parsing {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

/// Apply every queued shell command.  Returns `false` once the shell asked
/// to quit or the reader went away.
fn drain_commands(
    rx: &Receiver<ShellCommand>,
    manager: &mut AdLifecycleManager<SimulatedProvider, QueueForegroundSource, SystemClock>,
    sink: &mut LogEventSink,
) -> bool {
    loop {
        match rx.try_recv() {
            Ok(ShellCommand::App(cmd)) => manager.handle_command(cmd, sink),
            Ok(ShellCommand::Dismiss) => manager.provider_mut().dismiss(),
            Ok(ShellCommand::Stats) => info!("{:?}", manager.stats()),
            Ok(ShellCommand::Quit) | Err(TryRecvError::Disconnected) => return false,
            Err(TryRecvError::Empty) => return true,
        }
    }
}

/// Runs on the stdin thread.  App-state changes go straight through the
/// foreground notifier, like an OS callback would.
fn read_commands(notifier: &ForegroundNotifier, tx: &Sender<ShellCommand>) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let word = line.trim();
        if let Some(state) = AppLifecycle::from_name(word) {
            notifier.notify(state);
            continue;
        }
        let cmd = match word {
            "" => continue,
            "load" => ShellCommand::App(AppCommand::EnsureLoaded),
            "show" => ShellCommand::App(AppCommand::ShowIfEligible),
            "close" => ShellCommand::Dismiss,
            "stats" => ShellCommand::Stats,
            "quit" | "exit" => ShellCommand::Quit,
            other => {
                warn!("Unknown command '{}'", other);
                continue;
            }
        };
        if tx.send(cmd).is_err() {
            break;
        }
    }
}
