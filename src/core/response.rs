// src/core/response.rs

use crate::core::models::{RawResponse, ScanInfo, ServerError, SubmissionOutcome};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Element holding the new scan ID in a success document.
const ID_ELEMENT: &str = "id";
/// Root element of the server's error document.
const ERROR_ROOT: &str = "error";
const MESSAGE_ELEMENT: &str = "message";
const TRACE_ELEMENT: &str = "trace";
/// Root element of the scan list and its entries.
const SCANS_ROOT: &str = "scans";
const SCAN_ELEMENT: &str = "scan";
/// State reported for list entries that carry none.
const DEFAULT_STATE: &str = "Logged";

/// Reasons a response body could not be turned into the expected values.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response body is empty")]
    Empty,
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("response body is not an XML document")]
    NotXml,
    #[error("XML document ends inside <{0}>")]
    Truncated(String),
    #[error("missing <{0}> element")]
    MissingElement(&'static str),
    #[error("expected <{expected}/>, got <{found}/>")]
    UnexpectedRoot { expected: &'static str, found: String },
    #[error("invalid scan ID '{text}': {source}")]
    InvalidId {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid number in <{element}>: '{text}'")]
    InvalidNumber {
        element: &'static str,
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// A parsed element: its local name, its text content and its child elements.
#[derive(Debug, Default)]
struct Element {
    name: String,
    /// All text inside the element, descendants included, in document order.
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// This element or the first descendant named `name`, in document order.
    fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Trimmed text of the first direct child named `name`.
    fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .map(Element::content)
    }

    fn content(&self) -> &str {
        self.text.trim()
    }
}

/// Parses `body` into its root element.
///
/// Text split by comments or CDATA sections is joined as is. Fails when the
/// body holds no element, holds more than one root element, carries text
/// outside the root, or ends with elements still open.
fn parse_document(body: &str) -> Result<Element, ResponseError> {
    if body.trim().is_empty() {
        return Err(ResponseError::Empty);
    }

    let mut reader = Reader::from_str(body);
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if open.is_empty() && root.is_some() {
                    return Err(ResponseError::NotXml);
                }
                open.push(Element::new(element_name(&start)));
            }
            Event::Empty(start) => {
                if open.is_empty() && root.is_some() {
                    return Err(ResponseError::NotXml);
                }
                close(Element::new(element_name(&start)), &mut open, &mut root);
            }
            Event::End(_) => {
                if let Some(element) = open.pop() {
                    close(element, &mut open, &mut root);
                }
            }
            Event::Text(text) => {
                let decoded = text
                    .unescape()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                if open.is_empty() {
                    if !decoded.trim().is_empty() {
                        return Err(ResponseError::NotXml);
                    }
                    continue;
                }
                append_text(&mut open, &decoded);
            }
            Event::CData(data) => {
                if open.is_empty() {
                    return Err(ResponseError::NotXml);
                }
                append_text(&mut open, &String::from_utf8_lossy(&data.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(element) = open.pop() {
        return Err(ResponseError::Truncated(element.name));
    }
    root.ok_or(ResponseError::NotXml)
}

fn element_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Attaches a finished element to its parent, or makes it the root.
fn close(element: Element, open: &mut [Element], root: &mut Option<Element>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Text belongs to every element that is still open.
fn append_text(open: &mut [Element], text: &str) {
    for element in open.iter_mut() {
        element.text.push_str(text);
    }
}

/// Reads the scan ID out of a success document such as `<id>42</id>` or
/// `<result><id>42</id></result>`.
pub fn parse_scan_id(body: &str) -> Result<i64, ResponseError> {
    let root = parse_document(body)?;
    let text = root
        .find(ID_ELEMENT)
        .ok_or(ResponseError::MissingElement(ID_ELEMENT))?
        .content();
    text.parse::<i64>().map_err(|source| ResponseError::InvalidId {
        text: text.to_string(),
        source,
    })
}

/// Reads `message` and `trace` out of an error document. Absent elements are empty strings.
///
/// Documents that are XML but look nothing like an error report (other root,
/// neither element present) are rejected so the caller can fall back to the HTTP status.
pub fn parse_error_document(body: &str) -> Result<(String, String), ResponseError> {
    let root = parse_document(body)?;
    let message = root.find(MESSAGE_ELEMENT).map(|e| e.content().to_string());
    let trace = root.find(TRACE_ELEMENT).map(|e| e.content().to_string());
    if root.name != ERROR_ROOT && message.is_none() && trace.is_none() {
        return Err(ResponseError::MissingElement(ERROR_ROOT));
    }
    Ok((message.unwrap_or_default(), trace.unwrap_or_default()))
}

/// Reads the `<scans><scan>...</scan></scans>` list document.
///
/// Entries missing a field get the server's defaults: ID `-1`, empty name,
/// creation time `0`, state `Logged`, no progress.
pub fn parse_scan_list(body: &str) -> Result<Vec<ScanInfo>, ResponseError> {
    let root = parse_document(body)?;
    if root.name != SCANS_ROOT {
        return Err(ResponseError::UnexpectedRoot {
            expected: SCANS_ROOT,
            found: root.name,
        });
    }
    root.children
        .iter()
        .filter(|child| child.name == SCAN_ELEMENT)
        .map(scan_info)
        .collect()
}

fn scan_info(scan: &Element) -> Result<ScanInfo, ResponseError> {
    Ok(ScanInfo {
        id: child_number(scan, "id")?.unwrap_or(-1),
        name: scan.child_text("name").unwrap_or_default().to_string(),
        created_ms: child_number(scan, "created")?.unwrap_or(0),
        state: scan
            .child_text("state")
            .filter(|state| !state.is_empty())
            .unwrap_or(DEFAULT_STATE)
            .to_string(),
        error: scan.child_text("error").map(str::to_string),
        total_work_units: child_number(scan, "total_work_units")?.unwrap_or(0),
        performed_work_units: child_number(scan, "performed_work_units")?.unwrap_or(0),
    })
}

fn child_number(element: &Element, name: &'static str) -> Result<Option<i64>, ResponseError> {
    element
        .child_text(name)
        .map(|text| {
            text.parse::<i64>().map_err(|source| ResponseError::InvalidNumber {
                element: name,
                text: text.to_string(),
                source,
            })
        })
        .transpose()
}

/// Turns what the transport observed into the caller-visible outcome.
///
/// Never fails: every problem, including a success status without a usable
/// ID, becomes a [`SubmissionOutcome::Failure`]. A present `<id>0</id>` is a
/// valid ID.
pub fn interpret(raw: &RawResponse) -> SubmissionOutcome {
    match raw {
        RawResponse::Completed { body } => match parse_scan_id(body) {
            Ok(id) => {
                info!(id, "Scan server accepted submission.");
                SubmissionOutcome::Success { id }
            }
            Err(e) => {
                warn!(error = %e, "Scan server reply has no usable scan ID.");
                protocol_violation(&e).into()
            }
        },
        RawResponse::Failed { status, reason, body } => {
            rejection(*status, reason, body.as_deref()).into()
        }
    }
}

/// Turns the reply to a scan list request into the list, or the reason there is none.
pub fn interpret_scan_list(raw: &RawResponse) -> Result<Vec<ScanInfo>, ServerError> {
    match raw {
        RawResponse::Completed { body } => match parse_scan_list(body) {
            Ok(scans) => {
                debug!(count = scans.len(), "Scan list received.");
                Ok(scans)
            }
            Err(e) => {
                warn!(error = %e, "Scan list reply is unusable.");
                Err(protocol_violation(&e))
            }
        },
        RawResponse::Failed { status, reason, body } => {
            Err(rejection(*status, reason, body.as_deref()))
        }
    }
}

fn protocol_violation(error: &ResponseError) -> ServerError {
    ServerError::new(format!("Protocol violation: {}", error), "")
}

/// The server's own error document if the body holds one, else the HTTP status or transport error.
fn rejection(status: Option<u16>, reason: &str, body: Option<&str>) -> ServerError {
    if let Some(body) = body {
        match parse_error_document(body) {
            Ok((message, trace)) => {
                warn!(status = ?status, message = %message, "Scan server rejected request.");
                return ServerError::new(message, trace);
            }
            Err(e) => debug!(error = %e, "Error body carries no error document."),
        }
    }
    let message = match status {
        Some(code) => format!("HTTP response code {} ({})", code, reason),
        None => format!("Cannot reach scan server: {}", reason),
    };
    warn!(message = %message, "Request failed in transport.");
    ServerError::new(message, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(body: &str) -> RawResponse {
        RawResponse::Completed { body: body.to_string() }
    }

    fn failed(status: u16, body: Option<&str>) -> RawResponse {
        RawResponse::Failed {
            status: Some(status),
            reason: "Bad Request".to_string(),
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn nested_id_is_success() {
        let outcome = interpret(&completed("<result><id>42</id></result>"));
        assert_eq!(outcome, SubmissionOutcome::Success { id: 42 });
    }

    #[test]
    fn root_id_with_newline_is_success() {
        // The scan server answers "<id>17</id>\n".
        let outcome = interpret(&completed("<id>17</id>\n"));
        assert_eq!(outcome, SubmissionOutcome::Success { id: 17 });
    }

    #[test]
    fn zero_id_is_a_valid_id() {
        assert_eq!(interpret(&completed("<id>0</id>")), SubmissionOutcome::Success { id: 0 });
    }

    #[test]
    fn missing_id_is_a_protocol_violation() {
        let outcome = interpret(&completed("<result><name>x</name></result>"));
        assert!(!outcome.is_success());
        assert!(outcome.display_text().contains("missing <id>"));
    }

    #[test]
    fn non_numeric_id_is_a_protocol_violation() {
        let outcome = interpret(&completed("<id>forty-two</id>"));
        assert!(!outcome.is_success());
        assert!(outcome.display_text().contains("forty-two"));
    }

    #[test]
    fn empty_id_is_a_protocol_violation() {
        assert!(!interpret(&completed("<id/>")).is_success());
        assert!(!interpret(&completed("<id></id>")).is_success());
    }

    #[test]
    fn non_xml_success_body_is_a_protocol_violation() {
        assert!(!interpret(&completed("")).is_success());
        assert!(!interpret(&completed("42")).is_success());
        assert!(!interpret(&completed("<id>42")).is_success());
        assert!(!interpret(&completed("<id>42</name>")).is_success());
    }

    #[test]
    fn error_document_yields_message_and_trace() {
        let body = "<error><message>Bad input</message><trace>at line 3</trace></error>";
        let outcome = interpret(&failed(400, Some(body)));
        assert_eq!(outcome, SubmissionOutcome::failure("Bad input", "at line 3"));
        assert_eq!(outcome.display_text(), "Bad inputat line 3");
    }

    #[test]
    fn server_formatted_error_is_trimmed_and_unescaped() {
        let body = "<error>\n<message>nightly failed to submit</message>\n<trace>\njava.lang.Exception: Invalid deadline '2024'\n\tat &lt;init&gt;\n</trace>\n</error>\n";
        let outcome = interpret(&failed(400, Some(body)));
        match outcome {
            SubmissionOutcome::Failure { message, trace } => {
                assert_eq!(message, "nightly failed to submit");
                assert!(trace.starts_with("java.lang.Exception: Invalid deadline '2024'"));
                assert!(trace.contains("at <init>"));
                assert!(!trace.ends_with('\n'));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn missing_error_elements_are_empty_strings() {
        let outcome = interpret(&failed(400, Some("<error><message>Only message</message></error>")));
        assert_eq!(outcome, SubmissionOutcome::failure("Only message", ""));

        let outcome = interpret(&failed(400, Some("<error/>")));
        assert_eq!(outcome, SubmissionOutcome::failure("", ""));
    }

    #[test]
    fn absent_error_body_yields_status_diagnostic() {
        let outcome = interpret(&failed(503, None));
        assert_eq!(outcome, SubmissionOutcome::failure("HTTP response code 503 (Bad Request)", ""));
    }

    #[test]
    fn unparsable_error_body_yields_status_diagnostic() {
        let outcome = interpret(&failed(500, Some("Internal Server Error")));
        assert_eq!(outcome.display_text(), "HTTP response code 500 (Bad Request)");
    }

    #[test]
    fn unrelated_xml_error_body_yields_status_diagnostic() {
        let outcome = interpret(&failed(404, Some("<html><body>Not found</body></html>")));
        assert_eq!(outcome.display_text(), "HTTP response code 404 (Bad Request)");
    }

    #[test]
    fn network_failure_has_no_status() {
        let outcome = interpret(&RawResponse::Failed {
            status: None,
            reason: "connection refused".to_string(),
            body: None,
        });
        assert_eq!(outcome.display_text(), "Cannot reach scan server: connection refused");
    }

    #[test]
    fn cdata_trace_is_kept_verbatim() {
        let body = "<error><message>m</message><trace><![CDATA[a < b]]></trace></error>";
        assert_eq!(interpret(&failed(400, Some(body))), SubmissionOutcome::failure("m", "a < b"));
    }

    #[test]
    fn id_split_by_comment_or_cdata_is_joined() {
        assert_eq!(interpret(&completed("<id>4<!---->2</id>")), SubmissionOutcome::Success { id: 42 });
        assert_eq!(
            interpret(&completed("<id> 4<![CDATA[2]]> </id>")),
            SubmissionOutcome::Success { id: 42 }
        );
    }

    #[test]
    fn error_text_split_by_comment_or_cdata_keeps_inner_spaces() {
        let body = "<error><message>Bad<!-- c --> input</message><trace>a<![CDATA[b]]>c</trace></error>";
        assert_eq!(
            interpret(&failed(400, Some(body))),
            SubmissionOutcome::failure("Bad input", "abc")
        );
    }

    #[test]
    fn nested_markup_contributes_its_text() {
        let body = "<error><message>Bad <b>input</b> here</message></error>";
        assert_eq!(
            interpret(&failed(400, Some(body))),
            SubmissionOutcome::failure("Bad input here", "")
        );
    }

    #[test]
    fn declaration_and_surrounding_whitespace_are_accepted() {
        let body = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<id>3</id>\n";
        assert_eq!(interpret(&completed(body)), SubmissionOutcome::Success { id: 3 });
    }

    #[test]
    fn second_root_element_is_a_protocol_violation() {
        assert!(!interpret(&completed("<a/><id>5</id>")).is_success());
        assert!(!interpret(&completed("<id>5</id><id>6</id>")).is_success());
        assert!(matches!(parse_scan_id("<id>5</id><x/>"), Err(ResponseError::NotXml)));
    }

    const SCAN_LIST: &str = "<scans>\n\
        <scan><id>7</id><name>nightly</name><created>1700000000000</created><state>Running</state>\
        <total_work_units>10</total_work_units><performed_work_units>4</performed_work_units></scan>\n\
        <scan><id>6</id><name>calib</name><state>Failed</state><error>Beam lost</error></scan>\n\
        <scan/>\n\
        </scans>";

    #[test]
    fn scan_list_reads_entries_with_defaults() {
        let scans = parse_scan_list(SCAN_LIST).unwrap();
        assert_eq!(scans.len(), 3);

        assert_eq!(scans[0].id, 7);
        assert_eq!(scans[0].name, "nightly");
        assert_eq!(scans[0].created_ms, 1_700_000_000_000);
        assert_eq!(scans[0].state, "Running");
        assert_eq!(scans[0].percentage(), Some(40));

        assert_eq!(scans[1].error.as_deref(), Some("Beam lost"));
        assert_eq!(scans[1].percentage(), None);

        assert_eq!(scans[2].id, -1);
        assert_eq!(scans[2].state, "Logged");
        assert!(scans[2].name.is_empty());
    }

    #[test]
    fn empty_scan_list_is_ok() {
        assert!(parse_scan_list("<scans/>").unwrap().is_empty());
    }

    #[test]
    fn scan_list_needs_scans_root() {
        let result = interpret_scan_list(&completed("<scan><id>1</id></scan>"));
        let error = result.unwrap_err();
        assert_eq!(error.message, "Protocol violation: expected <scans/>, got <scan/>");
        assert_eq!(error.trace, "");
    }

    #[test]
    fn scan_list_rejects_bad_numbers() {
        let result = parse_scan_list("<scans><scan><id>x</id></scan></scans>");
        assert!(matches!(result, Err(ResponseError::InvalidNumber { element: "id", .. })));
    }

    #[test]
    fn scan_list_failure_uses_error_document_or_status() {
        let body = "<error><message>Not now</message><trace>busy</trace></error>";
        let error = interpret_scan_list(&failed(500, Some(body))).unwrap_err();
        assert_eq!(error, ServerError::new("Not now", "busy"));

        let error = interpret_scan_list(&failed(404, None)).unwrap_err();
        assert_eq!(error.to_string(), "HTTP response code 404 (Bad Request)");
    }
}
