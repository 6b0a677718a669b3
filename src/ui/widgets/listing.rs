// src/ui/widgets/listing.rs

use crate::app::App;
use crate::core::models::ScanInfo;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem},
};

/// Renders the server's scan list. Scans submitted from this session are marked with `*`.
pub fn render_listing(frame: &mut Frame, app: &mut App, area: Rect) {
    let status = if app.listing_loading { " loading..." } else { "" };
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Server Scans ({}){} (navigate with ↑ ↓)",
        app.scans.len(),
        status
    ));

    let mut items: Vec<ListItem> = Vec::new();
    if let Some(error) = &app.listing_error {
        items.push(ListItem::new(Line::from(Span::styled(
            format!("Cannot list scans: {}", error),
            Style::default().fg(Color::Red),
        ))));
    }
    items.extend(
        app.scans
            .iter()
            .map(|scan| ListItem::new(scan_line(scan, app.is_session_scan(scan.id)))),
    );

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    // The error line sits above the scans and is never selectable.
    let mut state = app.list_state.clone();
    if app.listing_error.is_some() {
        state.select(app.list_state.selected().map(|index| index + 1));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn scan_line(scan: &ScanInfo, from_session: bool) -> Line<'static> {
    let marker = if from_session { "*" } else { " " };
    let created = scan
        .created()
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    let progress = scan
        .percentage()
        .map(|percent| format!(" {:>3}%", percent))
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(
            format!("{}#{:<6}", marker, scan.id),
            Style::default().fg(Color::Green).bold(),
        ),
        Span::styled(format!(" {:<9}", scan.state), state_style(&scan.state)),
        Span::raw(format!("{} {} ", progress, created)),
        Span::styled(scan.name.clone(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(error) = &scan.error {
        spans.push(Span::styled(format!("  {}", error), Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

fn state_style(state: &str) -> Style {
    match state {
        "Finished" => Style::default().fg(Color::Green),
        "Failed" | "Aborted" => Style::default().fg(Color::Red),
        "Running" | "Paused" => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_scans_are_marked() {
        let scan = ScanInfo {
            id: 12,
            name: "nightly".to_string(),
            created_ms: 0,
            state: "Failed".to_string(),
            error: Some("Beam lost".to_string()),
            total_work_units: 0,
            performed_work_units: 0,
        };
        let line = scan_line(&scan, true).to_string();
        assert!(line.starts_with("*#12"));
        assert!(line.contains("Failed"));
        assert!(line.ends_with("nightly  Beam lost"));
        assert!(scan_line(&scan, false).to_string().starts_with(" #12"));
    }
}
