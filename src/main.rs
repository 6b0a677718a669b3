// src/main.rs

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use scan_submit::app::{App, AppState, LOG_TAIL_LINES, ServerReply};
use scan_submit::config::Settings;
use scan_submit::core::{HttpTransport, list_scans, submit};
use scan_submit::{logging, ui};
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Ticks between two reads of the log file while the log panel is open.
const LOG_REFRESH_TICKS: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let settings = Settings::load()?;
    let transport = Arc::new(HttpTransport::new(&settings)?);
    info!(server = %transport.base(), "scan-submit starting.");

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let result = run(&mut terminal, transport);

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    if let Err(e) = &result {
        error!(error = %e, "scan-submit stopped with an error.");
    }
    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, transport: Arc<HttpTransport>) -> Result<()> {
    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel(4);
    let log_path = logging::log_path();
    let mut ticks: u32 = 0;

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &tx, &transport)?;
        }

        while let Ok(reply) = rx.try_recv() {
            app.apply_reply(reply);
        }
        if app.take_listing_request() {
            spawn_listing(&tx, &transport);
        }

        app.on_tick();
        ticks = ticks.wrapping_add(1);
        if app.show_logs && ticks % LOG_REFRESH_TICKS == 0 {
            app.refresh_logs(logging::read_log_tail(&log_path, LOG_TAIL_LINES));
        }
    }
    Ok(())
}

fn handle_events(
    app: &mut App,
    tx: &mpsc::Sender<ServerReply>,
    transport: &Arc<HttpTransport>,
) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            if key.code == KeyCode::F(2) {
                app.toggle_logs();
                return Ok(());
            }
            match app.state {
                AppState::Editing => handle_editing_input(app, key, tx, transport),
                AppState::Submitting => {
                    if key.code == KeyCode::Esc {
                        app.quit();
                    }
                }
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Listing => handle_listing_input(app, key.code),
            }
        }
    }
    Ok(())
}

/// Handles input while the form is being filled in.
fn handle_editing_input(
    app: &mut App,
    key: KeyEvent,
    tx: &mpsc::Sender<ServerReply>,
    transport: &Arc<HttpTransport>,
) {
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab | KeyCode::Down => app.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.previous_field(),
        KeyCode::Left if app.show_logs => app.scroll_log_left(),
        KeyCode::Right if app.show_logs => app.scroll_log_right(),
        KeyCode::Char(' ') if app.focus.is_toggle() => app.toggle_focused(),
        KeyCode::Char(c) => app.input_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => {
            let Some(intent) = app.prepare_submission() else {
                return;
            };
            let tx_clone = tx.clone();
            let transport = Arc::clone(transport);
            tokio::spawn(async move {
                let outcome = submit(transport.as_ref(), &intent).await;
                let _ = tx_clone.send(ServerReply::Submitted(outcome)).await;
            });
        }
        _ => {}
    }
}

fn spawn_listing(tx: &mpsc::Sender<ServerReply>, transport: &Arc<HttpTransport>) {
    let tx_clone = tx.clone();
    let transport = Arc::clone(transport);
    tokio::spawn(async move {
        let scans = list_scans(transport.as_ref()).await;
        let _ = tx_clone.send(ServerReply::Scans(scans)).await;
    });
}

/// Handles input while a failed submission is displayed.
fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => app.back_to_form(),
        KeyCode::Char('l') => app.show_listing(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::Left if app.show_logs => app.scroll_log_left(),
        KeyCode::Right if app.show_logs => app.scroll_log_right(),
        _ => {}
    }
}

/// Handles input while the server's scan list is displayed.
fn handle_listing_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => app.back_to_form(),
        KeyCode::Char('r') => app.refresh_listing(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::Left if app.show_logs => app.scroll_log_left(),
        KeyCode::Right if app.show_logs => app.scroll_log_right(),
        _ => {}
    }
}
