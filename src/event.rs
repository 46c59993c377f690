//! Structured events emitted by the move processor.
//!
//! One event per consumed move request, in processing order. Consumers
//! subscribe through [`Engine::subscribe`](crate::engine::Engine::subscribe)
//! to build audit logs or to wait for specific moves in tests.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{MoveOutcome, MoveRequest};

/// A move request after the processor has dealt with it.
#[derive(Debug, Clone, Serialize)]
pub struct MoveEvent {
    /// Monotonic sequence number, starting at 1. Consumers can detect gaps.
    pub seq: u64,
    pub request: MoveRequest,
    pub outcome: MoveOutcome,
    pub processed_at: DateTime<Utc>,
}
