// src/core/models.rs

use chrono::{DateTime, Local};
use std::fmt;

// --- Wire Constants ---

/// HTTP verb used to submit a new scan.
pub const SUBMIT_METHOD: &str = "POST";

/// HTTP verb used to read the server's scan list.
pub const LIST_METHOD: &str = "GET";

/// Path of the server's scan list.
pub const SCANS_PATH: &str = "/scans";

/// Content type of the submitted command body.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// Deadline value the scan server reserves for "no deadline".
pub const NO_DEADLINE: &str = "0000-00-00 00:00:00";

/// Length of a deadline in `YYYY-MM-DD HH:MM:SS` form.
pub const DEADLINE_LEN: usize = 19;

// --- Submission Intent ---

/// A caller's description of a scan to submit, prior to request encoding.
///
/// Created fresh for every submission. Optional parameters that are absent are
/// left out of the request so the server applies its own defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionIntent {
    /// Name of the scan, placed in the URL path.
    pub name: String,
    /// XML command script, sent verbatim as the request body.
    pub command_body: String,
    /// May the scan wait in the queue if the server is busy?
    pub queue: bool,
    /// Run the configured pre/post scan commands?
    pub pre_post: bool,
    /// Timeout in seconds. Zero or negative means "server default".
    pub timeout: Option<i64>,
    /// Deadline as `YYYY-MM-DD HH:MM:SS`.
    pub deadline: Option<String>,
}

impl SubmissionIntent {
    pub fn new(name: impl Into<String>, command_body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command_body: command_body.into(),
            queue: true,
            pre_post: true,
            timeout: None,
            deadline: None,
        }
    }

    pub fn queue(mut self, queue: bool) -> Self {
        self.queue = queue;
        self
    }

    pub fn pre_post(mut self, pre_post: bool) -> Self {
        self.pre_post = pre_post;
        self
    }

    pub fn timeout(mut self, seconds: i64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    /// The timeout that will actually be sent, if any.
    pub fn effective_timeout(&self) -> Option<i64> {
        self.timeout.filter(|secs| *secs > 0)
    }

    /// The deadline that will actually be sent, if any.
    ///
    /// Anything that is not exactly 19 characters long, as well as the all-zero
    /// sentinel, counts as "no deadline".
    pub fn effective_deadline(&self) -> Option<&str> {
        self.deadline
            .as_deref()
            .filter(|d| d.chars().count() == DEADLINE_LEN && *d != NO_DEADLINE)
    }
}

// --- Submission Request ---

/// A fully encoded HTTP request for the scan server, ready for a transport to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub method: &'static str,
    /// `/scan/{encoded name}`, without query.
    pub path: String,
    /// Query parameters in wire order. Values are already percent-encoded.
    pub query: Vec<(&'static str, String)>,
    pub content_type: &'static str,
    pub body: String,
}

impl SubmissionRequest {
    /// The query string without the leading `?`, or `None` when no parameter deviates from the defaults.
    pub fn query_string(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .query
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        Some(pairs.join("&"))
    }

    /// Path followed by `?query` when there is one.
    pub fn path_and_query(&self) -> String {
        match self.query_string() {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

// --- Raw Response ---

/// What the transport observed, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// 2xx status; body should hold the success document.
    Completed { body: String },
    /// Non-success status, or no status at all when the request never completed.
    Failed {
        status: Option<u16>,
        reason: String,
        body: Option<String>,
    },
}

// --- Submission Outcome ---

/// Caller-visible result of a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success { id: i64 },
    Failure { message: String, trace: String },
}

impl SubmissionOutcome {
    pub fn failure(message: impl Into<String>, trace: impl Into<String>) -> Self {
        SubmissionOutcome::Failure {
            message: message.into(),
            trace: trace.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            SubmissionOutcome::Success { id } => Some(*id),
            SubmissionOutcome::Failure { .. } => None,
        }
    }

    /// Text shown to the user.
    ///
    /// Failures render as the message immediately followed by the trace, with no separator.
    pub fn display_text(&self) -> String {
        match self {
            SubmissionOutcome::Success { id } => format!("Submitted scan {}", id),
            SubmissionOutcome::Failure { message, trace } => format!("{}{}", message, trace),
        }
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<ServerError> for SubmissionOutcome {
    fn from(error: ServerError) -> Self {
        SubmissionOutcome::Failure {
            message: error.message,
            trace: error.trace,
        }
    }
}

// --- Server Error ---

/// A request the scan server refused, or whose reply made no sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub message: String,
    pub trace: String,
}

impl ServerError {
    pub fn new(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: trace.into(),
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.message, self.trace)
    }
}

// --- Scan Info ---

/// One entry of the server's scan list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanInfo {
    pub id: i64,
    pub name: String,
    /// Creation time in milliseconds since the epoch.
    pub created_ms: i64,
    /// Server-side state such as `Idle`, `Running`, `Finished` or `Failed`.
    pub state: String,
    pub error: Option<String>,
    pub total_work_units: i64,
    pub performed_work_units: i64,
}

impl ScanInfo {
    pub fn created(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp_millis(self.created_ms).map(|t| t.with_timezone(&Local))
    }

    /// Progress in percent, when the scan reports any work units.
    pub fn percentage(&self) -> Option<i64> {
        if self.total_work_units <= 0 {
            return None;
        }
        Some((self.performed_work_units * 100 / self.total_work_units).clamp(0, 100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_intent_uses_server_defaults() {
        let intent = SubmissionIntent::new("nightly", "<cmds/>");
        assert!(intent.queue);
        assert!(intent.pre_post);
        assert_eq!(intent.timeout, None);
        assert_eq!(intent.deadline, None);
    }

    #[test]
    fn non_positive_timeout_is_not_effective() {
        assert_eq!(SubmissionIntent::new("a", "").timeout(0).effective_timeout(), None);
        assert_eq!(SubmissionIntent::new("a", "").timeout(-5).effective_timeout(), None);
        assert_eq!(SubmissionIntent::new("a", "").timeout(7).effective_timeout(), Some(7));
    }

    #[test]
    fn sentinel_and_misshaped_deadlines_are_not_effective() {
        let sentinel = SubmissionIntent::new("a", "").deadline(NO_DEADLINE);
        assert_eq!(sentinel.effective_deadline(), None);

        let short = SubmissionIntent::new("a", "").deadline("2024-01-02");
        assert_eq!(short.effective_deadline(), None);

        let long = SubmissionIntent::new("a", "").deadline("2024-01-02 03:04:05.000");
        assert_eq!(long.effective_deadline(), None);

        let ok = SubmissionIntent::new("a", "").deadline("2024-01-02 03:04:05");
        assert_eq!(ok.effective_deadline(), Some("2024-01-02 03:04:05"));
    }

    #[test]
    fn failure_text_concatenates_message_and_trace() {
        let outcome = SubmissionOutcome::failure("Bad input", "at line 3");
        assert_eq!(outcome.display_text(), "Bad inputat line 3");
        assert_eq!(outcome.to_string(), "Bad inputat line 3");
        assert!(!outcome.is_success());
        assert_eq!(outcome.id(), None);
    }

    #[test]
    fn server_error_converts_to_failure() {
        let outcome = SubmissionOutcome::from(ServerError::new("Unknown scan", "at get"));
        assert_eq!(outcome, SubmissionOutcome::failure("Unknown scan", "at get"));
        assert_eq!(ServerError::new("a", "b").to_string(), "ab");
    }

    #[test]
    fn scan_progress_needs_work_units() {
        let mut info = ScanInfo {
            id: 3,
            name: "x".to_string(),
            created_ms: 0,
            state: "Running".to_string(),
            error: None,
            total_work_units: 0,
            performed_work_units: 0,
        };
        assert_eq!(info.percentage(), None);
        info.total_work_units = 4;
        info.performed_work_units = 1;
        assert_eq!(info.percentage(), Some(25));
        assert!(info.created().is_some());
    }

    #[test]
    fn path_and_query_omits_question_mark_without_params() {
        let request = SubmissionRequest {
            method: SUBMIT_METHOD,
            path: "/scan/x".to_string(),
            query: Vec::new(),
            content_type: XML_CONTENT_TYPE,
            body: String::new(),
        };
        assert_eq!(request.query_string(), None);
        assert_eq!(request.path_and_query(), "/scan/x");
    }
}
