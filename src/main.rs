//! serialmon - interactive serial port terminal
//!
//! Opens the port before touching the terminal, then runs the session loop
//! on a full-screen crossterm UI until the user quits.

use anyhow::Context;
use clap::Parser;
use serialmon_core::cli::{exit_code, Args, ExitCodes};
use serialmon_core::config::{self, AppConfig, LoggingSettings};
use serialmon_core::{DumpSinks, FsPaths, SerialTransport, SessionController};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod tui;

fn main() {
    let args = Args::parse();
    let code = match try_main(&args) {
        Ok(()) => ExitCodes::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            exit_code(&*err)
        }
    };
    std::process::exit(code);
}

fn try_main(args: &Args) -> anyhow::Result<()> {
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load settings")?;
    let _log_guard = init_logging(&config.logging);
    tracing::info!("Starting serialmon v{}", serialmon_core::VERSION);

    let result = run(args, &config);
    if let Err(e) = &result {
        tracing::error!("{e:#}");
    }
    result
}

/// Log to a daily rolling file; the terminal belongs to the UI
fn init_logging(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let dir = settings.directory.clone().or_else(config::log_dir)?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("WARNING: logging disabled, cannot create {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, "serialmon.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn run(args: &Args, config: &AppConfig) -> anyhow::Result<()> {
    let serial = args.serial_config()?;
    let options = args.session_options(config);

    let transport = if args.has_port() {
        let dumps = DumpSinks::open(
            args.dumpsnd.as_deref(),
            args.dumprec.as_deref(),
            args.dumpall.as_deref(),
        )?;
        Some(SerialTransport::open(serial.clone(), dumps)?)
    } else {
        tracing::info!("running without a port");
        None
    };

    // With a port the read timeout paces the loop; without one the keyboard does.
    let idle_wait = if transport.is_some() {
        Duration::ZERO
    } else {
        serial.timeout
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("Failed to install interrupt handler")?;
    }

    let mut controller = SessionController::new(options, transport, FsPaths::new());
    let mut guard = tui::TerminalGuard::enter().context("Failed to initialize terminal")?;
    let size = crossterm::terminal::size().unwrap_or((80, 24));
    let mut display = tui::TerminalDisplay::new(io::stdout(), args.padsize(), size);
    let mut keys = tui::CrosstermKeys::new(idle_wait);

    controller.start(&mut display);
    let result = controller.run(&mut keys, &mut display, || {
        interrupted.load(Ordering::SeqCst)
    });

    let restored = guard.restore();
    if let Some(transport) = controller.transport() {
        let (sent, received) = transport.totals();
        tracing::info!(sent, received, "session closed");
    }
    result.context("Session aborted")?;
    restored.context("Failed to restore terminal")?;
    Ok(())
}
