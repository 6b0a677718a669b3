// src/core/request.rs

use crate::core::models::{
    LIST_METHOD, SCANS_PATH, SUBMIT_METHOD, SubmissionIntent, SubmissionRequest, XML_CONTENT_TYPE,
};
use tracing::{debug, warn};

/// Builds the HTTP request that submits `intent` to the scan server.
///
/// Parameters that match the server defaults are left out: `queue` and
/// `pre_post` are only written when `false`, the timeout only when positive,
/// and the deadline only when it has the `YYYY-MM-DD HH:MM:SS` shape and is
/// not the all-zero sentinel. Order is fixed: queue, pre_post, timeout, deadline.
///
/// The name and the deadline are percent-encoded exhaustively, so `/`, spaces
/// and colons survive the trip to the server. The body is passed through untouched.
pub fn build(intent: &SubmissionIntent) -> SubmissionRequest {
    let mut query: Vec<(&'static str, String)> = Vec::new();

    if !intent.queue {
        query.push(("queue", "false".to_string()));
    }
    if !intent.pre_post {
        query.push(("pre_post", "false".to_string()));
    }

    let timeout = intent.effective_timeout();
    match (intent.timeout, timeout) {
        (_, Some(secs)) => query.push(("timeout", secs.to_string())),
        (Some(secs), None) => debug!(timeout = secs, "Non-positive timeout omitted."),
        (None, None) => {}
    }

    let deadline = intent.effective_deadline();
    match (intent.deadline.as_deref(), deadline) {
        (_, Some(value)) => query.push(("deadline", encode_component(value))),
        (Some(value), None) => debug!(deadline = value, "Deadline omitted, not a usable timestamp."),
        (None, None) => {}
    }

    if timeout.is_some() && deadline.is_some() {
        // The server refuses this combination, let it report the error.
        warn!(scan = %intent.name, "Submitting with both timeout and deadline.");
    }

    SubmissionRequest {
        method: SUBMIT_METHOD,
        path: format!("/scan/{}", encode_component(&intent.name)),
        query,
        content_type: XML_CONTENT_TYPE,
        body: intent.command_body.clone(),
    }
}

/// The request that reads the server's scan list. It carries no body.
pub fn scan_list_request() -> SubmissionRequest {
    SubmissionRequest {
        method: LIST_METHOD,
        path: SCANS_PATH.to_string(),
        query: Vec::new(),
        content_type: XML_CONTENT_TYPE,
        body: String::new(),
    }
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ~`.
fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
