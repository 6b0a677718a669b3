// src/core/submit.rs

use crate::core::models::{ScanInfo, ServerError, SubmissionIntent, SubmissionOutcome};
use crate::core::request::{build, scan_list_request};
use crate::core::response::{interpret, interpret_scan_list};
use crate::core::transport::Transport;
use tracing::{debug, info};

/// Submits a scan: builds the request, hands it to `transport`, and interprets the reply.
///
/// Every call is independent. There is no retry; whatever the first response
/// says is the outcome.
pub async fn submit<T: Transport>(transport: &T, intent: &SubmissionIntent) -> SubmissionOutcome {
    info!(scan = %intent.name, "Starting scan submission.");
    let request = build(intent);
    debug!(target_path = %request.path_and_query(), content_type = request.content_type, "Request built.");

    let raw = transport.send(&request).await;
    let outcome = interpret(&raw);

    match &outcome {
        SubmissionOutcome::Success { id } => info!(scan = %intent.name, id, "Scan submitted."),
        SubmissionOutcome::Failure { message, .. } => {
            info!(scan = %intent.name, message = %message, "Scan submission failed.")
        }
    }
    outcome
}

/// Reads the scan server's list of scans, newest state as the server reports it.
pub async fn list_scans<T: Transport>(transport: &T) -> Result<Vec<ScanInfo>, ServerError> {
    let raw = transport.send(&scan_list_request()).await;
    let scans = interpret_scan_list(&raw);
    if let Err(e) = &scans {
        info!(message = %e.message, "Scan list unavailable.");
    }
    scans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{RawResponse, SubmissionRequest};
    use std::sync::Mutex;

    /// Replays a canned response and remembers what it was asked to send.
    struct CannedTransport {
        response: RawResponse,
        seen: Mutex<Vec<SubmissionRequest>>,
    }

    impl CannedTransport {
        fn new(response: RawResponse) -> Self {
            Self { response, seen: Mutex::new(Vec::new()) }
        }
    }

    impl Transport for CannedTransport {
        async fn send(&self, request: &SubmissionRequest) -> RawResponse {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn success_round_trip() {
        let transport = CannedTransport::new(RawResponse::Completed {
            body: "<result><id>42</id></result>".to_string(),
        });
        let intent = SubmissionIntent::new("nightly", "<cmds/>")
            .timeout(30)
            .deadline("2024-01-02 03:04:05");

        let outcome = submit(&transport, &intent).await;

        assert_eq!(outcome, SubmissionOutcome::Success { id: 42 });
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].path_and_query(),
            "/scan/nightly?timeout=30&deadline=2024-01-02%2003%3A04%3A05"
        );
        assert_eq!(seen[0].body, "<cmds/>");
    }

    #[tokio::test]
    async fn failure_is_not_retried() {
        let transport = CannedTransport::new(RawResponse::Failed {
            status: Some(400),
            reason: "Bad Request".to_string(),
            body: Some("<error><message>Bad input</message><trace>at line 3</trace></error>".to_string()),
        });

        let outcome = submit(&transport, &SubmissionIntent::new("s", "<c/>")).await;

        assert_eq!(outcome.display_text(), "Bad inputat line 3");
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_sends_one_get() {
        let transport = CannedTransport::new(RawResponse::Completed {
            body: "<scans><scan><id>3</id><name>a</name><state>Idle</state></scan></scans>".to_string(),
        });

        let scans = list_scans(&transport).await.unwrap();

        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].id, 3);
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].path_and_query(), "/scans");
    }
}
