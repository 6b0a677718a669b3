// src/app.rs

use crate::core::models::{ScanInfo, ServerError, SubmissionIntent, SubmissionOutcome, SubmissionRequest};
use crate::core::request::build;
use chrono::{DateTime, Local};
use ratatui::widgets::{ListState, ScrollbarState};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, info, warn};

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Number of log lines kept for the log panel.
pub const LOG_TAIL_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Filling in the form.
    Editing,
    /// Waiting for the scan server.
    Submitting,
    /// Showing a failed submission.
    Finished,
    /// Showing the server's scan list.
    Listing,
}

/// Replies from background requests, delivered to the event loop.
#[derive(Debug)]
pub enum ServerReply {
    Submitted(SubmissionOutcome),
    Scans(Result<Vec<ScanInfo>, ServerError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FormField {
    Name,
    #[strum(to_string = "Commands file")]
    CommandsFile,
    Queue,
    #[strum(to_string = "Pre/Post")]
    PrePost,
    #[strum(to_string = "Timeout (s)")]
    Timeout,
    Deadline,
}

impl FormField {
    pub fn is_toggle(self) -> bool {
        matches!(self, FormField::Queue | FormField::PrePost)
    }
}

/// Raw form contents, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub name: String,
    pub commands_file: String,
    pub queue: bool,
    pub pre_post: bool,
    pub timeout: String,
    pub deadline: String,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            commands_file: String::new(),
            queue: true,
            pre_post: true,
            timeout: String::new(),
            deadline: String::new(),
        }
    }
}

impl SubmissionForm {
    /// Timeout field as a number. Blank or unparsable text means "not given".
    pub fn timeout_value(&self) -> Option<i64> {
        let text = self.timeout.trim();
        if text.is_empty() {
            return None;
        }
        text.parse().ok()
    }

    /// Deadline field, untrimmed. Its shape is checked by the request builder.
    pub fn deadline_value(&self) -> Option<String> {
        if self.deadline.is_empty() {
            None
        } else {
            Some(self.deadline.clone())
        }
    }

    pub fn intent(&self, command_body: impl Into<String>) -> SubmissionIntent {
        SubmissionIntent {
            name: self.name.clone(),
            command_body: command_body.into(),
            queue: self.queue,
            pre_post: self.pre_post,
            timeout: self.timeout_value(),
            deadline: self.deadline_value(),
        }
    }

    /// The request the current form would produce, with an empty body.
    pub fn preview(&self) -> SubmissionRequest {
        build(&self.intent(String::new()))
    }

    /// Reads the command script. Problems are reported as a failed submission.
    pub fn load_commands(&self) -> Result<String, SubmissionOutcome> {
        let path = self.commands_file.trim();
        if path.is_empty() {
            return Err(SubmissionOutcome::failure("No commands file given", ""));
        }
        std::fs::read_to_string(path).map_err(|e| {
            SubmissionOutcome::failure(format!("Cannot read commands file '{}': ", path), e.to_string())
        })
    }

    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::CommandsFile => Some(&mut self.commands_file),
            FormField::Timeout => Some(&mut self.timeout),
            FormField::Deadline => Some(&mut self.deadline),
            FormField::Queue | FormField::PrePost => None,
        }
    }

    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => Some(&self.name),
            FormField::CommandsFile => Some(&self.commands_file),
            FormField::Timeout => Some(&self.timeout),
            FormField::Deadline => Some(&self.deadline),
            FormField::Queue | FormField::PrePost => None,
        }
    }

    pub fn flag(&self, field: FormField) -> Option<bool> {
        match field {
            FormField::Queue => Some(self.queue),
            FormField::PrePost => Some(self.pre_post),
            _ => None,
        }
    }
}

/// A scan the server accepted during this session.
#[derive(Debug, Clone)]
pub struct SubmittedScan {
    pub id: i64,
    pub name: String,
    pub submitted_at: DateTime<Local>,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub form: SubmissionForm,
    pub focus: FormField,
    pub last_outcome: Option<SubmissionOutcome>,
    pub submitted: Vec<SubmittedScan>,
    pub scans: Vec<ScanInfo>,
    pub listing_error: Option<ServerError>,
    pub listing_loading: bool,
    listing_requested: bool,
    pub list_state: ListState,
    pub pending_name: Option<String>,
    pub outcome_scroll: u16,
    pub spinner_frame: usize,
    pub show_logs: bool,
    pub log_content: Vec<String>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Editing,
            form: SubmissionForm::default(),
            focus: FormField::Name,
            last_outcome: None,
            submitted: Vec::new(),
            scans: Vec::new(),
            listing_error: None,
            listing_loading: false,
            listing_requested: false,
            list_state: ListState::default(),
            pending_name: None,
            outcome_scroll: 0,
            spinner_frame: 0,
            show_logs: false,
            log_content: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
        }
    }

    // --- Form editing ---

    pub fn next_field(&mut self) {
        let fields: Vec<FormField> = FormField::iter().collect();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(index + 1) % fields.len()];
    }

    pub fn previous_field(&mut self) {
        let fields: Vec<FormField> = FormField::iter().collect();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(index + fields.len() - 1) % fields.len()];
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(text) = self.form.text_mut(self.focus) {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.form.text_mut(self.focus) {
            text.pop();
        }
    }

    pub fn toggle_focused(&mut self) {
        match self.focus {
            FormField::Queue => self.form.queue = !self.form.queue,
            FormField::PrePost => self.form.pre_post = !self.form.pre_post,
            _ => {}
        }
    }

    // --- Submission lifecycle ---

    /// Validates the form and reads the command script.
    ///
    /// Returns the intent to submit and moves to `Submitting`, or records a
    /// local failure and returns `None` without contacting the server.
    pub fn prepare_submission(&mut self) -> Option<SubmissionIntent> {
        if self.form.name.trim().is_empty() {
            self.show_failure(SubmissionOutcome::failure("Scan name is required", ""));
            return None;
        }
        match self.form.load_commands() {
            Ok(body) => {
                let intent = self.form.intent(body);
                info!(scan = %intent.name, "Submission requested from form.");
                self.pending_name = Some(intent.name.clone());
                self.last_outcome = None;
                self.state = AppState::Submitting;
                Some(intent)
            }
            Err(outcome) => {
                warn!(file = %self.form.commands_file, "Commands file unusable.");
                self.show_failure(outcome);
                None
            }
        }
    }

    pub fn apply_reply(&mut self, reply: ServerReply) {
        match reply {
            ServerReply::Submitted(outcome) => self.record_outcome(outcome),
            ServerReply::Scans(scans) => self.record_scans(scans),
        }
    }

    /// Applies the outcome of the in-flight submission.
    ///
    /// Success records the scan and switches to the listing, which asks for
    /// a fresh scan list; failure shows the message and trace.
    pub fn record_outcome(&mut self, outcome: SubmissionOutcome) {
        let name = self.pending_name.take().unwrap_or_default();
        match outcome {
            SubmissionOutcome::Success { id } => {
                self.submitted.push(SubmittedScan {
                    id,
                    name,
                    submitted_at: Local::now(),
                });
                self.last_outcome = Some(outcome);
                self.show_listing();
            }
            SubmissionOutcome::Failure { .. } => self.show_failure(outcome),
        }
    }

    /// Replaces the listing with the server's answer.
    ///
    /// The selection lands on the most recent scan of this session when the
    /// server lists it, otherwise on the last entry.
    pub fn record_scans(&mut self, scans: Result<Vec<ScanInfo>, ServerError>) {
        self.listing_loading = false;
        match scans {
            Ok(scans) => {
                debug!(count = scans.len(), "Listing updated.");
                let latest = self.submitted.last().map(|scan| scan.id);
                let selected = latest
                    .and_then(|id| scans.iter().position(|scan| scan.id == id))
                    .or_else(|| scans.len().checked_sub(1));
                self.scans = scans;
                self.listing_error = None;
                self.list_state.select(selected);
            }
            Err(error) => {
                warn!(message = %error.message, "Listing not updated.");
                self.listing_error = Some(error);
            }
        }
    }

    /// Hands out a pending scan list request exactly once.
    pub fn take_listing_request(&mut self) -> bool {
        std::mem::take(&mut self.listing_requested)
    }

    /// Was `id` submitted from this session?
    pub fn is_session_scan(&self, id: i64) -> bool {
        self.submitted.iter().any(|scan| scan.id == id)
    }

    fn show_failure(&mut self, outcome: SubmissionOutcome) {
        self.last_outcome = Some(outcome);
        self.outcome_scroll = 0;
        self.state = AppState::Finished;
    }

    // --- Navigation ---

    pub fn on_tick(&mut self) {
        if self.state == AppState::Submitting {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Fresh form. The list of submitted scans is kept.
    pub fn reset(&mut self) {
        self.form = SubmissionForm::default();
        self.back_to_form();
    }

    /// Back to the form with the previous values, e.g. to fix and resubmit.
    pub fn back_to_form(&mut self) {
        self.state = AppState::Editing;
        self.focus = FormField::Name;
        self.last_outcome = None;
        self.outcome_scroll = 0;
    }

    pub fn show_listing(&mut self) {
        self.state = AppState::Listing;
        self.refresh_listing();
    }

    pub fn refresh_listing(&mut self) {
        self.listing_loading = true;
        self.listing_requested = true;
    }

    pub fn select_previous(&mut self) {
        if self.scans.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(current.saturating_sub(1)));
    }

    pub fn select_next(&mut self) {
        if self.scans.is_empty() {
            return;
        }
        let last = self.scans.len() - 1;
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((current + 1).min(last)));
    }

    pub fn scroll_up(&mut self) {
        self.outcome_scroll = self.outcome_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.outcome_scroll = self.outcome_scroll.saturating_add(1);
    }

    // --- Log panel ---

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }

    pub fn refresh_logs(&mut self, lines: Vec<String>) {
        self.log_content = lines;
        self.set_log_scroll(self.log_horizontal_scroll);
    }

    /// Width in characters of the longest log line.
    pub fn log_max_width(&self) -> usize {
        self.log_content
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn scroll_log_left(&mut self) {
        self.set_log_scroll(self.log_horizontal_scroll.saturating_sub(4));
    }

    pub fn scroll_log_right(&mut self) {
        self.set_log_scroll(self.log_horizontal_scroll.saturating_add(4));
    }

    fn set_log_scroll(&mut self, offset: usize) {
        self.log_horizontal_scroll = offset.min(self.log_max_width());
        self.log_horizontal_scroll_state = self
            .log_horizontal_scroll_state
            .position(self.log_horizontal_scroll);
    }
}
