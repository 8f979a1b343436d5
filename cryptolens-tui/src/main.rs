//! CryptoLens TUI: market dashboard with sidebar controls, a price table and
//! a percent-change chart.
//!
//! Logs go to `{cache_dir}/cryptolens/cryptolens.log` so the alternate
//! screen stays clean.

mod app;
mod input;
mod persistence;
mod theme;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cryptolens_board::AppConfig;
use cryptolens_core::data::MarketSession;

use crate::app::{AppState, Reload};

fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    init_logging();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    let source = config.build_source()?;
    let session = MarketSession::new(source, config.cache_capacity);
    info!(source = %session.source_kind(), capacity = config.cache_capacity, "starting TUI");

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let state_path = persistence::default_path();
    let persisted = persistence::load(&state_path, persistence::PersistedState::from_config(&config));

    let mut app = AppState::new(session, &config);
    persistence::apply(&mut app, persisted);
    app.request(Reload::Load);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    if let Err(err) = persistence::save(&state_path, &persistence::extract(&app)) {
        warn!(error = %err, path = %state_path.display(), "failed to save UI state");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render; a pending load shows its "Loading" status in this frame.
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Run the pending load (blocking), then redraw.
        if app.pending.is_some() {
            app.run_pending();
            continue;
        }

        // 3. Poll for input events.
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}

/// File logging under the cache dir. Falls back to no logging if the file
/// can't be opened.
fn init_logging() {
    let Ok(path) = log_path() else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn log_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cryptolens");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log dir: {}", dir.display()))?;
    Ok(dir.join("cryptolens.log"))
}
