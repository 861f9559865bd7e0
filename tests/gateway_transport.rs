//! Gateway Fake-Transport Tests
//!
//! This module drives the pattern lookup gateway through a scripted fake
//! transport, with no MySQL server involved. It validates:
//! - The payload decode rules for all three lookup domains
//! - Absent-row and NULL-column handling
//! - Connection accounting: every opened connection is closed, on the
//!   match, no-match, and fetch-failure paths alike
//! - Error precedence between fetch and close failures

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use phrasebook::{
    Gateway, GatewayConfig, Lookup, LookupConnection, LookupKey, LookupRow, LookupTransport,
    PhrasebookError, Result,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// What the fake connection does when asked for the first row
#[derive(Debug, Clone)]
enum FetchOutcome {
    /// A matching row with the given payload column value
    Row(Option<&'static str>),
    /// No matching row
    NoRow,
    /// A query failure
    Fail(&'static str),
}

/// Shared observation log for one fake transport
#[derive(Debug, Clone, Default)]
struct TransportLog {
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    lookups: Arc<Mutex<Vec<Lookup>>>,
}

impl TransportLog {
    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn lookups(&self) -> Vec<Lookup> {
        self.lookups.lock().unwrap().clone()
    }
}

/// Scripted transport standing in for MySQL
#[derive(Debug, Clone)]
struct FakeTransport {
    log: TransportLog,
    outcome: FetchOutcome,
    connect_error: Option<&'static str>,
    close_error: Option<&'static str>,
}

struct FakeConn {
    log: TransportLog,
    outcome: FetchOutcome,
    close_error: Option<&'static str>,
}

impl LookupTransport for FakeTransport {
    type Conn = FakeConn;

    async fn connect(&self, _config: &GatewayConfig) -> Result<FakeConn> {
        if let Some(message) = self.connect_error {
            return Err(PhrasebookError::connection_failed(message));
        }
        self.log.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConn {
            log: self.log.clone(),
            outcome: self.outcome.clone(),
            close_error: self.close_error,
        })
    }
}

impl LookupConnection for FakeConn {
    async fn fetch_first(&mut self, lookup: &Lookup) -> Result<Option<LookupRow>> {
        self.log.lookups.lock().unwrap().push(lookup.clone());
        match &self.outcome {
            FetchOutcome::Row(payload) => {
                Ok(Some(LookupRow { payload: payload.map(str::to_string) }))
            }
            FetchOutcome::NoRow => Ok(None),
            FetchOutcome::Fail(message) => Err(PhrasebookError::query_failed(*message)),
        }
    }

    async fn close(self) -> Result<()> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        match self.close_error {
            Some(message) => Err(PhrasebookError::connection_failed(message)),
            None => Ok(()),
        }
    }
}

/// Gateway over a fake transport plus the log observing it
fn scripted_gateway(outcome: FetchOutcome) -> (Gateway<FakeTransport>, TransportLog) {
    scripted_gateway_with(outcome, None, None)
}

fn scripted_gateway_with(
    outcome: FetchOutcome,
    connect_error: Option<&'static str>,
    close_error: Option<&'static str>,
) -> (Gateway<FakeTransport>, TransportLog) {
    let log = TransportLog::default();
    let transport =
        FakeTransport { log: log.clone(), outcome, connect_error, close_error };
    let config = GatewayConfig::new(
        "localhost".to_string(),
        "tester".to_string(),
        "secret".to_string(),
        "jarvis".to_string(),
    );
    (Gateway::with_transport(config, transport), log)
}

// ============================================================================
// Payload Decode Rules
// ============================================================================

#[tokio::test]
async fn test_request_patterns_decode_from_matching_row() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::Row(Some(r#"{"request": ["hi", "hello"]}"#)));

    let patterns = gateway.fetch_request_patterns("greeting").await.unwrap();
    assert_eq!(patterns, Some(vec!["hi".to_string(), "hello".to_string()]));
}

#[tokio::test]
async fn test_request_patterns_missing_key_is_empty_list() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::Row(Some(r#"{"responses": ["misfiled"]}"#)));

    let patterns = gateway.fetch_request_patterns("greeting").await.unwrap();
    assert_eq!(patterns, Some(Vec::new()));
}

#[tokio::test]
async fn test_request_patterns_no_row_is_absent() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::NoRow);

    let patterns = gateway.fetch_request_patterns("greeting").await.unwrap();
    assert_eq!(patterns, None);
}

#[tokio::test]
async fn test_response_patterns_decode_responses_key() {
    let (gateway, _log) =
        scripted_gateway(FetchOutcome::Row(Some(r#"{"responses": ["yes sir", "on it"]}"#)));

    let patterns = gateway.fetch_response_patterns("confirm").await.unwrap();
    assert_eq!(patterns, Some(vec!["yes sir".to_string(), "on it".to_string()]));
}

#[tokio::test]
async fn test_invalid_json_payload_is_decode_error() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::Row(Some("not json")));

    let err = gateway.fetch_request_patterns("greeting").await.unwrap_err();
    assert_eq!(err.error_code(), "DECODE_FAILED");
    assert!(err.message().contains("user_requests"));
}

#[tokio::test]
async fn test_null_payload_on_list_lookup_is_decode_error() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::Row(None));

    let err = gateway.fetch_response_patterns("confirm").await.unwrap_err();
    assert_eq!(err.error_code(), "DECODE_FAILED");
    assert!(err.message().contains("jarvis_responses"));
}

// ============================================================================
// Tag Assignments
// ============================================================================

#[tokio::test]
async fn test_tag_assignment_returns_raw_column_text() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::Row(Some("deliver_package")));

    let task = gateway.fetch_tag_assignment(42).await.unwrap();
    assert_eq!(task.as_deref(), Some("deliver_package"));
}

#[tokio::test]
async fn test_tag_assignment_no_row_is_absent() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::NoRow);

    let task = gateway.fetch_tag_assignment(42).await.unwrap();
    assert_eq!(task, None);
}

#[tokio::test]
async fn test_tag_assignment_null_column_is_absent() {
    let (gateway, _log) = scripted_gateway(FetchOutcome::Row(None));

    let task = gateway.fetch_tag_assignment(42).await.unwrap();
    assert_eq!(task, None);
}

// ============================================================================
// Connection Accounting
// ============================================================================

#[tokio::test]
async fn test_connection_released_on_match_path() {
    let (gateway, log) = scripted_gateway(FetchOutcome::Row(Some(r#"{"request": []}"#)));

    gateway.fetch_request_patterns("greeting").await.unwrap();
    assert_eq!(log.opened(), 1);
    assert_eq!(log.closed(), 1);
}

#[tokio::test]
async fn test_connection_released_on_no_match_path() {
    let (gateway, log) = scripted_gateway(FetchOutcome::NoRow);

    gateway.fetch_tag_assignment(7).await.unwrap();
    assert_eq!(log.opened(), 1);
    assert_eq!(log.closed(), 1);
}

#[tokio::test]
async fn test_connection_released_on_fetch_failure_path() {
    let (gateway, log) = scripted_gateway(FetchOutcome::Fail("table gone"));

    let err = gateway.fetch_response_patterns("confirm").await.unwrap_err();
    assert_eq!(err.error_code(), "QUERY_FAILED");
    assert_eq!(log.opened(), 1);
    assert_eq!(log.closed(), 1);
}

#[tokio::test]
async fn test_every_operation_owns_its_connection() {
    let (gateway, log) = scripted_gateway(FetchOutcome::NoRow);

    gateway.fetch_request_patterns("greeting").await.unwrap();
    gateway.fetch_response_patterns("confirm").await.unwrap();
    gateway.fetch_tag_assignment(7).await.unwrap();

    assert_eq!(log.opened(), 3);
    assert_eq!(log.closed(), 3);
}

// ============================================================================
// Error Precedence
// ============================================================================

#[tokio::test]
async fn test_connect_failure_propagates_without_close() {
    let (gateway, log) =
        scripted_gateway_with(FetchOutcome::NoRow, Some("host unreachable"), None);

    let err = gateway.fetch_request_patterns("greeting").await.unwrap_err();
    assert_eq!(err.error_code(), "CONNECTION_FAILED");
    assert_eq!(log.opened(), 0);
    assert_eq!(log.closed(), 0);
}

#[tokio::test]
async fn test_fetch_error_takes_precedence_over_close_error() {
    let (gateway, log) =
        scripted_gateway_with(FetchOutcome::Fail("table gone"), None, Some("socket reset"));

    let err = gateway.fetch_request_patterns("greeting").await.unwrap_err();
    assert_eq!(err.error_code(), "QUERY_FAILED");
    assert!(err.message().contains("table gone"));
    assert_eq!(log.closed(), 1, "close still happens when the fetch fails");
}

#[tokio::test]
async fn test_close_error_after_successful_fetch_surfaces() {
    let (gateway, _log) = scripted_gateway_with(
        FetchOutcome::Row(Some(r#"{"request": ["hi"]}"#)),
        None,
        Some("socket reset"),
    );

    let err = gateway.fetch_request_patterns("greeting").await.unwrap_err();
    assert_eq!(err.error_code(), "CONNECTION_FAILED");
    assert!(err.message().contains("socket reset"));
}

// ============================================================================
// Query Shape
// ============================================================================

#[tokio::test]
async fn test_lookup_reaches_transport_with_bound_key() {
    let (gateway, log) = scripted_gateway(FetchOutcome::NoRow);

    gateway.fetch_request_patterns("greeting").await.unwrap();
    gateway.fetch_tag_assignment(42).await.unwrap();

    let lookups = log.lookups();
    assert_eq!(lookups.len(), 2);
    assert_eq!(lookups[0].key, LookupKey::Text("greeting".to_string()));
    assert_eq!(lookups[1].key, LookupKey::Id(42));
    // The key never appears in the SQL text itself
    assert_eq!(
        lookups[0].sql(),
        "SELECT REQUEST FROM user_requests WHERE REQUESTTYPE = ? LIMIT 1"
    );
    assert!(!lookups[1].sql().contains("42"));
}
