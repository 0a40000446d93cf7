mod engine;
mod event;
mod forms;
mod lofi;
mod modal;
mod projection;
mod state;
mod task;
mod theme;
mod ui;

use std::io;
use std::path::PathBuf;

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    event::{self as term_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::info;

use cram_core::config::Config;
use cram_core::platform;
use cram_core::store::{JsonStore, Store};

use crate::engine::Engine;
use crate::event::AppEvent;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("cram.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    info!("cram starting…");

    let config = Config::load().unwrap_or_default();
    let store = JsonStore::new(resolve_data_path(&config));
    info!("data file: {}", store.path().display());

    let snapshot = store.load()?;
    let state = AppState::from_snapshot(snapshot);

    run(state, store, config).await
}

/// CLI arg, then $CRAM_DATA, then the configured default.
fn resolve_data_path(config: &Config) -> PathBuf {
    if let Some(arg) = std::env::args().nth(1) {
        return PathBuf::from(arg);
    }
    if let Ok(env) = std::env::var("CRAM_DATA") {
        if !env.is_empty() {
            return PathBuf::from(env);
        }
    }
    config.storage.data_file.clone()
}

async fn run(state: AppState, store: JsonStore, config: Config) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::channel::<AppEvent>(1024);

    // ── Background task: keyboard events ──────────────────────────────────────
    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
        match term_event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if input_tx.blocking_send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
            Ok(Event::Resize(w, h)) => {
                if input_tx.blocking_send(AppEvent::Resize(w, h)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });

    let lofi_cfg = config.lofi.clone();
    let mut engine = Engine::new(state, Box::new(store), lofi_cfg.clone(), tx.clone());
    for t in engine.startup_tasks() {
        task::spawn(t, tx.clone(), &lofi_cfg);
    }

    // ── Main loop: draw, wait, reduce, schedule ───────────────────────────────
    loop {
        terminal.draw(|frame| ui::draw(frame, &engine.state))?;

        let Some(event) = rx.recv().await else {
            break;
        };
        for t in engine.handle(event) {
            task::spawn(t, tx.clone(), &lofi_cfg);
        }

        if engine.state.should_quit {
            break;
        }
    }

    // ── Teardown ──────────────────────────────────────────────────────────────
    engine.shutdown().await;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("cram exited cleanly");

    Ok(())
}
