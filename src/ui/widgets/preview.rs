// src/ui/widgets/preview.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Renders the request the current form would produce.
///
/// Mirrors the builder exactly, so fields that will be dropped (a timeout of
/// zero, a deadline of the wrong shape) are visibly missing from the target.
pub fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Request Preview");
    let request = app.form.preview();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Method  ", Style::default().fg(Color::DarkGray)),
            Span::raw(request.method),
        ]),
        Line::from(vec![
            Span::styled("Target  ", Style::default().fg(Color::DarkGray)),
            Span::styled(request.path_and_query(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Type    ", Style::default().fg(Color::DarkGray)),
            Span::raw(request.content_type),
        ]),
        Line::from(vec![
            Span::styled("Body    ", Style::default().fg(Color::DarkGray)),
            Span::raw(if app.form.commands_file.trim().is_empty() {
                "(no commands file)".to_string()
            } else {
                format!("contents of {}", app.form.commands_file.trim())
            }),
        ]),
        Line::from(""),
    ];

    let intent = app.form.intent(String::new());
    if !app.form.timeout.trim().is_empty() && intent.effective_timeout().is_none() {
        lines.push(Line::from(Span::styled(
            "Timeout ignored: expects a positive number of seconds.",
            Style::default().fg(Color::Yellow),
        )));
    }
    if intent.deadline.is_some() && intent.effective_deadline().is_none() {
        lines.push(Line::from(Span::styled(
            "Deadline ignored: expects YYYY-MM-DD HH:MM:SS.",
            Style::default().fg(Color::Yellow),
        )));
    }
    if intent.effective_timeout().is_some() && intent.effective_deadline().is_some() {
        lines.push(Line::from(Span::styled(
            "Server will refuse a timeout together with a deadline.",
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
