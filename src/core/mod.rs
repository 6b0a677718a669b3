// src/core/mod.rs

// Protocol side of a scan submission: the value types, the request builder,
// the response interpreter, and the transport seam between them.

/// Value types that flow through a submission: intent, request, raw response, outcome.
pub mod models;

/// Turns a `SubmissionIntent` into an encoded HTTP request.
pub mod request;

/// Turns the scan server's XML replies into outcomes and scan lists.
pub mod response;

pub mod submit;
pub mod transport;

pub use models::{
    RawResponse, ScanInfo, ServerError, SubmissionIntent, SubmissionOutcome, SubmissionRequest,
};
pub use request::{build, scan_list_request};
pub use response::{interpret, interpret_scan_list};
pub use submit::{list_scans, submit};
pub use transport::{HttpTransport, Transport};
