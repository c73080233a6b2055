//! # Legion Tray Binary
//!
//! Toggles battery conservation mode, FnLock and keyboard backlight on
//! Lenovo laptops, elevating through polkit (or sudo) when required.
//!
//! # Usage
//!
//! ```bash
//! # Interactive tray menu on the terminal
//! legion_tray
//!
//! # One-shot status, JSON output
//! legion_tray status --format json
//!
//! # One-shot toggle
//! legion_tray toggle conservation
//!
//! # Alternate config, verbose logging
//! legion_tray --config ./config.toml -v run
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use legion::attribute::AttributeKind;
use legion::config::{ConfigLoader, LogLevel};
use legion::consts::DEFAULT_CONFIG_PATH;
use legion::tray_config::TrayConfig;
use legion_tray::controller::{ToggleController, ToggleOutcome};
use legion_tray::elevators::probe_elevator;
use legion_tray::events::TrayEvent;
use legion_tray::frontend::{TrayFrontend, spawn_input_reader};
use legion_tray::menu::TrayMenu;
use legion_tray::terminal::TerminalGate;
use legion_tray::worker::ToggleWorker;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Legion Tray - Lenovo hardware toggles
#[derive(Parser, Debug)]
#[command(name = "legion_tray")]
#[command(version)]
#[command(about = "Toggle Lenovo conservation mode, FnLock and keyboard backlight")]
#[command(long_about = None)]
struct Args {
    /// Path to configuration file (missing file means built-in defaults)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive tray menu (default)
    Run,
    /// Print the current state of every attribute
    Status {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Toggle one attribute and print the result
    Toggle {
        /// conservation, fn-lock or kbd-led
        attribute: AttributeKind,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// One attribute in `status --format json`.
#[derive(Serialize)]
struct StatusEntry<'a> {
    attribute: AttributeKind,
    path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("legion_tray failed: {}", e);
        eprintln!("legion_tray: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = Args::parse();

    let config = TrayConfig::load_or_default(&args.config)?;
    setup_tracing(&args, config.shared.log_level);
    config.validate()?;

    info!(
        "{} v{} starting (config {})",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        args.config.display()
    );

    let command = args.command.take().unwrap_or(Command::Run);
    let gate = TerminalGate::new();
    let mut elevator = probe_elevator(config.elevation.method);
    if matches!(command, Command::Run) {
        // stdin carries menu input while the tray runs.
        elevator = elevator.with_terminal_gate(gate.clone());
    }
    let controller = ToggleController::from_config(&config, Box::new(elevator));

    let missing = controller.missing_attributes();
    if !missing.is_empty() {
        warn!(
            "Attributes not present on this machine: {:?}. Unsupported model?",
            missing
        );
    }

    match command {
        Command::Run => run_tray(&config, controller, gate),
        Command::Status { format } => print_status(&controller, format),
        Command::Toggle { attribute } => toggle_once(&controller, attribute),
    }
}

fn run_tray(
    config: &TrayConfig,
    controller: ToggleController,
    gate: TerminalGate,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel();

    let quit = tx.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        if quit.send(TrayEvent::Quit).is_err() {
            debug!("tray loop already stopped");
        }
    })?;

    spawn_input_reader(tx.clone(), gate)?;

    let worker = ToggleWorker::new(Arc::new(controller), tx);
    let menu = TrayMenu::new(config.tray.notifications);
    let mut frontend = TrayFrontend::new(
        menu,
        worker,
        rx,
        config.tray.refresh_interval(),
        std::io::stdout(),
    );
    frontend.run()?;
    Ok(())
}

fn print_status(
    controller: &ToggleController,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = controller.snapshot();
    match format {
        Format::Text => {
            for (kind, result) in snapshot.iter() {
                match result {
                    Ok(value) => println!("{}: {}", kind.label(), value),
                    Err(e) => println!("{}: unavailable ({})", kind.label(), e),
                }
            }
        }
        Format::Json => {
            let attributes: Vec<StatusEntry<'_>> = snapshot
                .iter()
                .map(|(kind, result)| StatusEntry {
                    attribute: kind,
                    path: controller.binding(kind).path(),
                    value: result.as_ref().ok().map(|v| v.token()),
                    state: result.as_ref().ok().map(|v| v.display_text()),
                    error: result.as_ref().err().map(ToString::to_string),
                })
                .collect();
            let report = serde_json::json!({
                "elevator": controller.elevator_name(),
                "attributes": attributes,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn toggle_once(
    controller: &ToggleController,
    kind: AttributeKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = controller.toggle(kind);
    match &report.outcome {
        ToggleOutcome::Applied { value } => println!("{}: {}", kind.label(), value),
        ToggleOutcome::Diverged {
            requested,
            observed,
        } => println!(
            "{}: requested {}, hardware reports {}",
            kind.label(),
            requested,
            observed
        ),
        ToggleOutcome::Unconfirmed { requested, warning } => println!(
            "{}: set to {} (unconfirmed: {})",
            kind.label(),
            requested,
            warning
        ),
        ToggleOutcome::Failed { error } => return Err(error.clone().into()),
    }
    Ok(())
}

/// Setup tracing subscriber from CLI flags and the configured level.
///
/// Logs go to stderr; stdout carries the menu.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match configured {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
