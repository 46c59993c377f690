//! Metric instrument factories.
//!
//! Instruments come from the `"triage-rs"` meter on the globally registered
//! `MeterProvider`. Without OTLP export that provider is a no-op.

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Meter};

use crate::model::{MoveOutcome, MoveRequest, Stage};

fn meter() -> Meter {
    opentelemetry::global::meter("triage-rs")
}

/// Counter: move requests offered to the queue.
/// Labels: `to`, `result` ("ok" | "full" | "closed" | "invalid").
pub fn moves_submitted() -> Counter<u64> {
    meter()
        .u64_counter("triage.moves.submitted")
        .with_description("Number of move requests offered to the queue")
        .build()
}

/// Counter: move requests consumed by the processor.
/// Labels: `from`, `to`, `outcome` ("applied" | "stale" | "storage_failed").
pub fn moves_processed() -> Counter<u64> {
    meter()
        .u64_counter("triage.moves.processed")
        .with_description("Number of move requests consumed by the processor")
        .build()
}

/// Counter: item loads.
/// Labels: `stage`, `result` ("ok" | "not_found" | "io_error").
pub fn loads() -> Counter<u64> {
    meter()
        .u64_counter("triage.loads")
        .with_description("Number of item loads")
        .build()
}

pub(crate) fn record_submitted(req: &MoveRequest, result: &'static str) {
    moves_submitted().add(
        1,
        &[
            KeyValue::new("to", req.to.dir_name()),
            KeyValue::new("result", result),
        ],
    );
}

pub(crate) fn record_processed(req: &MoveRequest, outcome: MoveOutcome) {
    moves_processed().add(
        1,
        &[
            KeyValue::new("from", req.from.dir_name()),
            KeyValue::new("to", req.to.dir_name()),
            KeyValue::new("outcome", outcome.to_string()),
        ],
    );
}

pub(crate) fn record_load(stage: Stage, result: &'static str) {
    loads().add(
        1,
        &[
            KeyValue::new("stage", stage.dir_name()),
            KeyValue::new("result", result),
        ],
    );
}
