// src/ui/widgets/outcome_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use crate::core::models::SubmissionOutcome;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render_outcome_view(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Result (scroll with ↑ ↓)");

    let paragraph = match app.state {
        AppState::Editing => Paragraph::new(vec![
            Line::from("Fill in the form and press Enter to submit."),
            Line::from("Tab / Shift-Tab move between fields, Space toggles checkboxes."),
        ])
        .alignment(Alignment::Center),
        AppState::Submitting => {
            let spinner_char = SPINNER_CHARS[app.spinner_frame];
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                Span::raw("Submitting... waiting for the scan server."),
            ]))
            .alignment(Alignment::Center)
        }
        AppState::Finished | AppState::Listing => Paragraph::new(outcome_lines(app.last_outcome.as_ref())),
    };

    frame.render_widget(
        paragraph
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.outcome_scroll, 0)),
        area,
    );
}

fn outcome_lines(outcome: Option<&SubmissionOutcome>) -> Vec<Line<'static>> {
    let Some(outcome) = outcome else {
        return Vec::new();
    };
    match outcome {
        SubmissionOutcome::Success { .. } => vec![Line::from(Span::styled(
            outcome.display_text(),
            Style::default().fg(Color::Green),
        ))],
        SubmissionOutcome::Failure { .. } => {
            let mut lines = vec![
                Line::from(Span::styled("Submission failed", Style::default().fg(Color::Red).bold())),
                Line::from(""),
            ];
            // Message and trace exactly as concatenated for the user.
            lines.extend(
                outcome
                    .display_text()
                    .lines()
                    .map(|line| Line::from(line.to_string())),
            );
            lines
        }
    }
}
