// src/ui/mod.rs

use crate::app::{App, AppState};
use ratatui::prelude::*;

mod layout;
mod widgets;

pub fn render(app: &mut App, frame: &mut Frame) {
    let layout = layout::create_layout(frame.area(), app.show_logs);

    widgets::form::render_form(frame, app, layout.form);

    // Accepted scans get the listing; everything else shows the current result.
    if app.state == AppState::Listing {
        widgets::listing::render_listing(frame, app, layout.report);
    } else {
        widgets::outcome_view::render_outcome_view(frame, app, layout.report);
    }

    widgets::preview::render_preview(frame, app, layout.preview);
    widgets::footer::render_footer(frame, app, layout.footer);

    if app.show_logs {
        widgets::log_view::render_log_view(frame, app, layout.log_panel);
    }
}
