// src/ui/widgets/log_view.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation},
};

/// Renders the tail of the log file with a horizontal scrollbar for long lines.
pub fn render_log_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title("Logs (scroll with ← →)")
        .borders(Borders::ALL);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let max_width = app.log_max_width();
    app.log_horizontal_scroll_state = app.log_horizontal_scroll_state.content_length(max_width);

    // Keep the newest lines visible.
    let visible = inner_area.height.saturating_sub(1) as usize;
    let skip = app.log_content.len().saturating_sub(visible);

    let log_lines: Vec<Line> = app
        .log_content
        .iter()
        .skip(skip)
        .map(|line_str| style_log_line(line_str))
        .collect();

    let offset = u16::try_from(app.log_horizontal_scroll).unwrap_or(u16::MAX);
    let log_paragraph = Paragraph::new(log_lines).scroll((0, offset));
    frame.render_widget(log_paragraph, inner_area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::HorizontalBottom).thumb_symbol("■");
    let scrollbar_area = Rect {
        x: inner_area.x,
        y: inner_area.y + inner_area.height.saturating_sub(1),
        width: inner_area.width,
        height: 1,
    };
    frame.render_stateful_widget(scrollbar, scrollbar_area, &mut app.log_horizontal_scroll_state);
}

/// Greys out the timestamp. The fmt layer writes `TIMESTAMP  LEVEL message`.
fn style_log_line(line: &str) -> Line<'_> {
    match line.split_once(' ') {
        Some((timestamp, rest)) => Line::from(vec![
            Span::styled(timestamp, Style::default().fg(Color::DarkGray)),
            Span::raw(" "),
            Span::styled(rest, level_style(rest)),
        ]),
        None => Line::from(line),
    }
}

fn level_style(rest: &str) -> Style {
    let level = rest.trim_start();
    if level.starts_with("ERROR") {
        Style::default().fg(Color::Red)
    } else if level.starts_with("WARN") {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}
