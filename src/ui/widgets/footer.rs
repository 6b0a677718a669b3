// src/ui/widgets/footer.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let spans = match app.state {
        AppState::Editing => Line::from(vec![
            key("Enter"),
            Span::raw(" submit, "),
            key("Tab"),
            Span::raw(" next field, "),
            key("Space"),
            Span::raw(" toggle, "),
            key("F2"),
            Span::raw(" logs, "),
            key("Esc"),
            Span::raw(" quit."),
        ]),
        AppState::Submitting => Line::from("Submitting... Press Esc to quit."),
        AppState::Finished => Line::from(vec![
            key("[N]"),
            Span::raw("ew scan, "),
            key("[E]"),
            Span::raw("dit and resubmit, "),
            key("[L]"),
            Span::raw("ist, "),
            key("[Q]"),
            Span::raw("uit"),
        ]),
        AppState::Listing => Line::from(vec![
            key("[N]"),
            Span::raw("ew scan, "),
            key("[E]"),
            Span::raw("dit last form, "),
            key("[R]"),
            Span::raw("efresh, "),
            key("[Q]"),
            Span::raw("uit"),
        ]),
    };

    let footer = Paragraph::new(spans).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
