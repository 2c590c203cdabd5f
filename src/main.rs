use std::io::stdout;
use std::panic;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nomad_install::config::InstallerConfig;
use nomad_install::error::{InstallError, Result};
use nomad_install::event::{Event, EventHandler};
use nomad_install::system;
use nomad_install::ui;
use nomad_install::wizard::{BackendEvent, WizardAction, WizardApp};

#[derive(Parser, Debug)]
#[command(name = "nomad-install")]
#[command(author, version, about = "Guided installer that writes NomadBSD to a local disk")]
struct Args {
    /// Path to installer config file (default: /usr/local/etc/nomad-install.toml)
    #[arg(long)]
    config: Option<String>,

    /// Simulate all operations without touching any disk
    #[arg(long)]
    dryrun: bool,

    /// Override the backend program the installer invokes
    #[arg(long)]
    backend: Option<String>,

    /// Log file path (logging disabled if not specified)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging only if log file is specified
    if let Some(ref log_path) = args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .ok();

        if let Some(file) = file {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();

            info!("Starting nomad-install");
        }
    }

    let mut config = match args.config.as_deref() {
        Some(path) => InstallerConfig::load_from(path)?,
        None => InstallerConfig::load()?,
    };

    // Flags override config
    if args.dryrun {
        config.general.dryrun = true;
    }
    if let Some(backend) = args.backend {
        config.backend.program = backend;
    }

    // Set up panic handler to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;

    let mut app = WizardApp::new(config);
    let result = run(&mut terminal, &mut app).await;

    restore_terminal()?;

    if let Err(ref e) = result {
        error!("Installer error: {}", e);
    }

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().map_err(|e| InstallError::Terminal(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| InstallError::Terminal(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).map_err(|e| InstallError::Terminal(e.to_string()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().map_err(|e| InstallError::Terminal(e.to_string()))?;
    execute!(stdout(), LeaveAlternateScreen).map_err(|e| InstallError::Terminal(e.to_string()))?;
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut WizardApp,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut events = EventHandler::new(tick_rate);

    // Receiver for the backend invocation in flight, if any
    let mut backend_rx: Option<mpsc::UnboundedReceiver<BackendEvent>> = None;

    loop {
        terminal
            .draw(|frame| ui::draw(frame, app))
            .map_err(|e| InstallError::Terminal(e.to_string()))?;

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Event::Key(key)) => {
                        if let Some(action) = app.handle_key(key) {
                            match action {
                                WizardAction::LaunchBackend => {
                                    backend_rx = app.launch_backend();
                                }
                                WizardAction::Reboot => {
                                    if let Err(e) = system::reboot(app.is_dryrun()) {
                                        app.set_error(format!("Reboot failed: {}", e));
                                    } else {
                                        app.should_exit = true;
                                    }
                                }
                            }
                        }
                    }
                    Some(Event::Resize) => {
                        // Terminal will redraw on next pass
                    }
                    Some(Event::Tick) => {
                        app.tick();
                    }
                    None => break,
                }
            }
            backend_event = next_backend_event(&mut backend_rx) => {
                match backend_event {
                    Some(event) => {
                        let finished = matches!(event, BackendEvent::Finished(_));
                        app.handle_backend_event(event);
                        if finished {
                            backend_rx = None;
                        }
                    }
                    None => backend_rx = None,
                }
            }
        }

        if app.should_exit {
            break;
        }
    }

    Ok(())
}

/// Pends forever while no backend is running, so the select loop only
/// wakes for input and ticks.
async fn next_backend_event(
    rx: &mut Option<mpsc::UnboundedReceiver<BackendEvent>>,
) -> Option<BackendEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
