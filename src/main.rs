//! A collapsible tree sidebar for the terminal.
//!
//! Loads a JSON document of folder/file nodes (preferring a previously
//! persisted snapshot), renders it as an interactive tree, and persists every
//! creation back to the snapshot.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
};
use crate::core::store::{self, TreeStore};
use crate::ui::{
    layout::AppLayout, popup::AlertPopup, sidebar::SidebarWidget, theme::Theme, toolbar::Toolbar,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "JSON-backed collapsible tree sidebar")]
struct Cli {
    /// Sidebar document to load (a snapshot, if present, wins).
    #[arg(default_value = "sidebar.json")]
    source: PathBuf,

    /// Snapshot file mutations are persisted to.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Ignore an existing snapshot and load the source document.
    #[arg(long)]
    fresh: bool,
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // ── load the forest before any rendering ──────────────────
    let snapshot = cli
        .snapshot
        .clone()
        .unwrap_or_else(store::default_snapshot_path);
    let tree_store = TreeStore::load(&cli.source, snapshot, cli.fresh).await;
    let user_config = config::AppConfig::load();
    let mut state = AppState::new(tree_store, user_config);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stdout_handle = stdout();
    execute!(
        stdout_handle,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    // Tick fast enough that the blur-grace interval resolves promptly.
    let mut events = spawn_event_reader(Duration::from_millis(40));

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| {
            state.terminal_area = frame.area();
            let layout = AppLayout::from_area(frame.area());

            let target = state
                .selected_folder
                .map(|id| state.store.forest.get(id).name.as_str());
            frame.render_widget(
                Toolbar {
                    target,
                    content_hidden: state.content_hidden,
                },
                layout.toolbar_area,
            );

            let tree_block = Block::default()
                .title(" treebar ")
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());

            if state.content_hidden {
                frame.render_widget(
                    Paragraph::new("content hidden").style(Theme::hint_style()).block(tree_block),
                    layout.tree_area,
                );
            } else {
                let sidebar = SidebarWidget::new(&state.store.forest, &state.open_folders)
                    .editing(state.editing.as_ref())
                    .target_folder(state.selected_folder)
                    .block(tree_block);
                frame.render_stateful_widget(sidebar, layout.tree_area, &mut state.tree_state);
            }

            let hint = state.config.status_bar_hint();
            let status_text = state.status_message.as_deref().unwrap_or(&hint);
            let status = Paragraph::new(status_text).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);

            if let Some(message) = &state.alert {
                frame.render_widget(AlertPopup { message }, frame.area());
            }
        })?;

        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Key(k) => handler::handle_key(&mut state, k),
            AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
            AppEvent::FocusLost => handler::handle_focus_lost(&mut state),
            AppEvent::Tick => handler::handle_tick(&mut state),
            AppEvent::Resize(_, _) => {}
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    Ok(())
}
