//! Integration tests for telemetry initialization and span helpers.

use triage_rs::model::{ItemId, MoveOutcome, MoveRequest};
use triage_rs::telemetry::{TelemetryConfig, init_telemetry, metrics, moves};

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process; an Err here just
    // means another test got there first.
    let config = TelemetryConfig {
        endpoint: None,
        service_name: "triage-test".to_string(),
        default_level: "debug".to_string(),
    };
    if let Ok(guard) = init_telemetry(config) {
        assert!(!guard.is_exporting());
        guard.force_flush();
    }
}

#[test]
fn move_span_creates_and_records_outcome() {
    let req = MoveRequest::accept(ItemId::new(11).unwrap());
    let span = moves::start_move_span(&req);
    moves::record_outcome(&span, MoveOutcome::Stale);
}

#[test]
fn metric_instruments_build_without_a_provider() {
    metrics::moves_submitted().add(1, &[]);
    metrics::moves_processed().add(1, &[]);
    metrics::loads().add(1, &[]);
}
