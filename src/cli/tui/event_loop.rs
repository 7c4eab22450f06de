//! TUI event loop and handling

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Duration};
use tokio::sync::mpsc;

use crate::cli::tui::app::App;
use crate::cli::tui::ui::ui;
use crate::models::{AppEvent, FocusedPane, OperationKind};

/// Run the main TUI event loop
pub async fn run_tui_event_loop(mut app: App, tick_rate: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel();

    let tx_tick = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_rate);
        loop {
            interval.tick().await;
            if tx_tick.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    let mut state_rx = app.orchestrator.state();
    app.refresh_ports(tx.clone());

    let result = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &app)) {
            break Err(e.into());
        }

        tokio::select! {
            _ = tokio::task::spawn_blocking(|| event::poll(Duration::from_millis(50))) => {
                match poll_key() {
                    Ok(Some(key)) => {
                        if handle_key_event(&mut app, key, &tx) {
                            break Ok(());
                        }
                    }
                    Ok(None) => {}
                    Err(e) => break Err(e.into()),
                }
            }

            Ok(()) = state_rx.changed() => {
                let state = state_rx.borrow_and_update().clone();
                app.sync_state(state);
            }

            Some(event) = rx.recv() => app.handle_app_event(event),
        }
    };

    if app.is_busy() {
        log::warn!("Quitting while {} is still running", app.state.operation);
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn poll_key() -> io::Result<Option<KeyEvent>> {
    if event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key));
            }
        }
    }
    Ok(None)
}

/// Apply one key press; returns `true` when the app should quit
pub fn handle_key_event(app: &mut App, key: KeyEvent, tx: &mpsc::UnboundedSender<AppEvent>) -> bool {
    if app.show_erase_confirmation {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_erase(tx.clone()),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.decline_erase(),
            _ => {}
        }
        return false;
    }

    if app.show_help {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::Esc => app.show_help = false,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Tab => app.toggle_focused_pane(),
        KeyCode::Char('h') | KeyCode::Char('?') => app.show_help = true,
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Enter => app.select_highlighted(),
        KeyCode::PageUp if app.focused_pane == FocusedPane::LogPane => app.page_up(),
        KeyCode::PageDown if app.focused_pane == FocusedPane::LogPane => app.page_down(),
        KeyCode::Home if app.focused_pane == FocusedPane::LogPane => app.scroll_log_top(),
        KeyCode::End if app.focused_pane == FocusedPane::LogPane => app.scroll_log_bottom(),
        KeyCode::Char('p') => app.start_operation(OperationKind::Program, tx.clone()),
        KeyCode::Char('t') => app.start_operation(OperationKind::Test, tx.clone()),
        KeyCode::Char('r') => app.start_operation(OperationKind::Reset, tx.clone()),
        KeyCode::Char('e') => app.request_erase(),
        KeyCode::Char('c') => app.clear_log(),
        KeyCode::Char('u') => {
            if !app.is_busy() {
                app.refresh_ports(tx.clone());
            }
        }
        _ => {}
    }
    false
}
