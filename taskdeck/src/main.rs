//! `taskdeck`: local-first terminal to-do manager.
//!
//! Launches the TUI over a local SQLite task database. Configuration via
//! CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Default database location
//! cargo run --bin taskdeck
//!
//! # Explicit database, no demo rows
//! cargo run --bin taskdeck -- --db-path ./tasks.db --no-demo-data
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{mpsc, watch};
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::app::{App, AppAction};
use taskdeck::config::{AppConfig, CliArgs};
use taskdeck::prefs::PrefsManager;
use taskdeck::query::LiveQuery;
use taskdeck::store::{StoreCommand, StoreHandle, spawn_store_with_capacity};
use taskdeck::ui;
use taskdeck_core::TaskStore;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            AppConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(db = %config.db_path.display(), "taskdeck starting");

    // Open the database before touching the terminal so open failures
    // print normally.
    let store = match TaskStore::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: could not open task database: {e}");
            return Err(io::Error::other(e));
        }
    };
    if config.seed_demo {
        match store.count() {
            Ok(0) => {
                if let Err(e) = store.seed_demo() {
                    tracing::warn!(error = %e, "failed to seed demo tasks");
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed to inspect task table"),
        }
    }

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, store, &config).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskdeck exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: TaskStore,
    config: &AppConfig,
) -> io::Result<()> {
    let (handle, mut evt_rx) = spawn_store_with_capacity(store, config.channel_capacity);

    let prefs = PrefsManager::load(config.prefs_path.clone());
    let mut prefs_rx = prefs.subscribe();
    let (search_tx, search_rx) = watch::channel(String::new());

    let live = LiveQuery::spawn(handle.clone(), search_rx, prefs_rx.clone());
    let mut results_rx = live.results();

    let mut app = App::new(
        prefs.current(),
        config.max_task_name_len,
        config.timestamp_format.clone(),
    );

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Pull in the latest query result if it changed.
        if results_rx.has_changed().unwrap_or(false) {
            app.set_tasks(results_rx.borrow_and_update().clone());
        }
        if prefs_rx.has_changed().unwrap_or(false) {
            app.prefs = *prefs_rx.borrow_and_update();
        }

        // Step 3: Drain store events (non-blocking).
        while let Ok(event) = evt_rx.try_recv() {
            let taskdeck::store::StoreEvent::Error(msg) = event;
            app.status = Some(msg);
        }

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(action) = app.handle_key_event(key) {
                dispatch(&mut app, action, &handle, &prefs, &search_tx);
            }
        }

        if app.should_quit {
            let _ = handle.try_send(StoreCommand::Shutdown);
            live.stop();
            return Ok(());
        }
    }
}

/// Execute an action produced by a key press.
fn dispatch(
    app: &mut App,
    action: AppAction,
    handle: &StoreHandle,
    prefs: &PrefsManager,
    search_tx: &watch::Sender<String>,
) {
    match action {
        AppAction::Create { name, important } => {
            send_command(app, handle, StoreCommand::Create { name, important });
        }
        AppAction::Update(task) => send_command(app, handle, StoreCommand::Update(task)),
        AppAction::Delete(task) => send_command(app, handle, StoreCommand::Delete(task)),
        AppAction::Restore(task) => send_command(app, handle, StoreCommand::Insert(task)),
        AppAction::SearchChanged(search) => {
            let _ = search_tx.send(search);
        }
        AppAction::SortOrderChanged(sort_order) => prefs.set_sort_order(sort_order),
        AppAction::HideCompletedChanged(hide) => prefs.set_hide_completed(hide),
        AppAction::Quit => {}
    }
}

/// Send a command to the store worker, surfacing failures on the status line.
fn send_command(app: &mut App, handle: &StoreHandle, cmd: StoreCommand) {
    match handle.try_send(cmd) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            app.status = Some("Store busy, try again".to_string());
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            app.status = Some("Store stopped".to_string());
        }
    }
}
