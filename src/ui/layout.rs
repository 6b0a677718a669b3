// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen areas of the submission UI.
pub struct AppLayout {
    pub form: Rect,
    pub report: Rect,
    pub preview: Rect,
    pub footer: Rect,
    pub log_panel: Rect,
}

/// Height of the form block: one row per field plus borders.
const FORM_HEIGHT: u16 = 8;

/// Splits the frame into form (top), content (middle) and footer (bottom).
///
/// The content row holds the result/listing area and the request preview,
/// plus the log panel when `show_logs` is set.
pub fn create_layout(frame_size: Rect, show_logs: bool) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORM_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let content_constraints = if show_logs {
        vec![Constraint::Percentage(40), Constraint::Percentage(25), Constraint::Percentage(35)]
    } else {
        vec![Constraint::Percentage(60), Constraint::Percentage(40)]
    };

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(content_constraints)
        .split(main_chunks[1]);

    AppLayout {
        form: main_chunks[0],
        report: content_chunks[0],
        preview: content_chunks[1],
        log_panel: if show_logs { content_chunks[2] } else { Rect::default() },
        footer: main_chunks[2],
    }
}
