//! Move processing span helpers.

use tracing::Span;

use crate::model::{MoveOutcome, MoveRequest};

/// Start a span for applying one move request.
///
/// The `move.outcome` field is declared empty and filled by
/// [`record_outcome`].
pub fn start_move_span(req: &MoveRequest) -> Span {
    tracing::info_span!(
        "move.apply",
        "move.id" = %req.id,
        "move.from" = %req.from,
        "move.to" = %req.to,
        "move.outcome" = tracing::field::Empty,
    )
}

/// Record how the move ended on its span.
pub fn record_outcome(span: &Span, outcome: MoveOutcome) {
    span.record("move.outcome", tracing::field::display(outcome));
}
