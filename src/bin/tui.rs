//! Concierge TUI (Terminal User Interface)
//!
//! A terminal chat client for the hotel virtual assistant.

use anyhow::{Context, Result};
use clap::Parser;
use concierge::config::Settings;
use concierge::status::{StatusConfig, StatusSimulator};
use concierge::transport::{BridgeEvent, ChatBridge};
use concierge::tui::{ui::ui, App};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tracing::info;

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Parser)]
#[command(name = "concierge-tui")]
#[command(about = "Chat with the hotel virtual assistant from your terminal")]
struct Cli {
    /// WebSocket URL of the assistant backend
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory conversation exports are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let mut settings = Settings::load(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint;
    }
    if let Some(export_dir) = cli.export_dir {
        settings.export_dir = export_dir;
    }
    settings.validate()?;

    let data_dir = Settings::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("concierge.log"))?;
    concierge::init_logging(log_file)?;
    info!("Starting concierge-tui against {}", settings.endpoint);

    let bridge = ChatBridge::new(settings.endpoint.clone());
    let mut bridge_rx = bridge.subscribe();
    let connecting = bridge.clone();
    tokio::spawn(async move {
        // Failures are logged and published by the bridge itself
        let _ = connecting.connect().await;
    });

    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let _status = StatusSimulator::spawn(StatusConfig::from(&settings), status_tx);

    let mut app = App::new(&settings);

    install_panic_hook();
    let mut terminal = init_terminal()?;

    let res = run_app(&mut terminal, &mut app, &bridge, &mut bridge_rx, &mut status_rx).await;

    bridge.disconnect();
    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        eprintln!("Error: {:?}", err);
    }
    res
}

async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    bridge: &ChatBridge,
    bridge_rx: &mut broadcast::Receiver<BridgeEvent>,
    status_rx: &mut mpsc::UnboundedReceiver<bool>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        app.update(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key, bridge);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            received = bridge_rx.recv() => match received {
                Ok(event) => app.handle_bridge_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => app.handle_lagged(skipped),
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },
            Some(online) = status_rx.recv() => app.set_online(online),
            _ = ticker.tick() => app.on_tick(),
        }
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
