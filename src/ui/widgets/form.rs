// src/ui/widgets/form.rs

use crate::app::{App, AppState, FormField};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use strum::IntoEnumIterator;

/// Width of the label column, including the trailing space.
const LABEL_WIDTH: usize = 16;
/// Focus marker in front of each line.
const MARKER_WIDTH: usize = 2;

/// Renders the submission form, one line per field.
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::Editing;
    let block = Block::default().borders(Borders::ALL).title("Scan Submission");

    let lines: Vec<Line> = FormField::iter()
        .map(|field| {
            let focused = editing && field == app.focus;
            let marker = if focused { "> " } else { "  " };
            let label = format!("{:<width$}", field.to_string(), width = LABEL_WIDTH);
            let value = match app.form.flag(field) {
                Some(true) => "[x]".to_string(),
                Some(false) => "[ ]".to_string(),
                None => app.form.text(field).unwrap_or_default().to_string(),
            };
            let style = if focused {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(label, Style::default().fg(Color::DarkGray)),
                Span::styled(value, style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);

    // Cursor only on a focused text field while editing.
    if editing {
        if let Some(text) = app.form.text(app.focus) {
            let row = FormField::iter().position(|f| f == app.focus).unwrap_or(0) as u16;
            let column = (MARKER_WIDTH + LABEL_WIDTH + text.chars().count()) as u16;
            frame.set_cursor_position((area.x + 1 + column, area.y + 1 + row));
        }
    }
}
