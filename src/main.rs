// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod data;
mod events;
mod poller;
mod settings;
mod ui;

use api::{ApiClient, MessagesBody};
use app::App;
use poller::{DashboardEvent, Poller, PollerHandle};
use settings::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "relay-doctor")]
#[command(about = "Diagnostic TUI for monitoring an HL7 relay's dead-letter queue")]
struct Args {
    /// Backend base URL (e.g. http://localhost:8080)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write diagnostics to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch one snapshot, write it to this JSON file, and exit
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref())?;

    let overrides = Overrides {
        endpoint: args.endpoint.clone(),
        refresh_secs: args.refresh,
        timeout_secs: args.timeout,
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    let client = ApiClient::builder()
        .endpoint(&settings.endpoint)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .context("failed to build API client")?;

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_snapshot(&client, export_path));
    }

    // The poller runs on the runtime's worker threads; the TUI loop stays
    // on the main thread.
    let _guard = rt.enter();
    let (handle, events) = Poller::spawn(client, Duration::from_secs(settings.refresh_secs));

    run_tui(handle, events)
}

/// Set up the tracing subscriber when a log file was requested.
///
/// Without a log file no subscriber is installed: the TUI owns the
/// terminal, so diagnostics must not reach stdout or stderr.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Run the TUI with the given poller wiring
fn run_tui(handle: PollerHandle, events: mpsc::Receiver<DashboardEvent>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(handle, events);

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Teardown: stop the poller before giving the terminal back
    app.shutdown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Apply whatever the poller produced since the last frame
        app.drain_events();

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, area.height.saturating_sub(4) / 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(8),    // DLQ table
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::messages::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

            // Render detail overlay if active
            if app.detail_open {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for input with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content rows start after header (1) + table border (1)
                    // + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Fetch one snapshot and write it to a JSON file
async fn export_snapshot(client: &ApiClient, path: &Path) -> Result<()> {
    let stats = client
        .fetch_stats()
        .await
        .context("failed to fetch stats")?;

    let messages = match client
        .fetch_failed_messages()
        .await
        .context("failed to fetch failed messages")?
    {
        MessagesBody::Messages(messages) => messages,
        MessagesBody::Error(err) => anyhow::bail!("backend error: {}", err.message),
    };

    let health = client.check_health().await;

    let export = serde_json::json!({
        "status": health.status.label(),
        "stats": stats,
        "failed_messages": messages,
    });

    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Exported DLQ snapshot to: {}", path.display());
    Ok(())
}
