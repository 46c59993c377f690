//! Move processor: the single consumer of the move request queue.
//!
//! Applies one request at a time, in queue order: index phase first, then the
//! file rename. It is the only writer of the stage index after seeding, which
//! is what keeps two moves of the same ID from racing.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info};

use crate::error::Result;
use crate::event::MoveEvent;
use crate::index::StageIndex;
use crate::model::{MoveOutcome, MoveRequest};
use crate::storage::StageStore;
use crate::telemetry::metrics;
use crate::telemetry::moves::{record_outcome, start_move_span};

pub struct MoveProcessor {
    rx: mpsc::Receiver<MoveRequest>,
    index: Arc<StageIndex>,
    store: Arc<StageStore>,
    shutdown: Arc<watch::Sender<bool>>,
    processed: watch::Sender<u64>,
    events: broadcast::Sender<MoveEvent>,
}

impl MoveProcessor {
    pub(crate) fn new(
        rx: mpsc::Receiver<MoveRequest>,
        index: Arc<StageIndex>,
        store: Arc<StageStore>,
        shutdown: Arc<watch::Sender<bool>>,
        processed: watch::Sender<u64>,
        events: broadcast::Sender<MoveEvent>,
    ) -> Self {
        Self {
            rx,
            index,
            store,
            shutdown,
            processed,
            events,
        }
    }

    /// Run on a dedicated tokio task.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    /// Drain the queue until shutdown is signalled or every producer is gone.
    ///
    /// On shutdown, requests still waiting in the queue are dropped.
    pub async fn run(mut self) -> Result<()> {
        let mut stop = self.shutdown.subscribe();
        info!("move processor started");

        loop {
            let next = tokio::select! {
                biased;
                _ = stop.wait_for(|stopped| *stopped) => {
                    info!(pending = self.rx.len(), "move processor shutting down");
                    return Ok(());
                }
                next = self.rx.recv() => next,
            };

            let Some(req) = next else {
                info!("move queue closed, move processor exiting");
                return Ok(());
            };

            let outcome = self.apply(req).await;
            self.finish(req, outcome);
        }
    }

    /// Apply one request fully before the next is dequeued.
    async fn apply(&self, req: MoveRequest) -> MoveOutcome {
        let span = start_move_span(&req);
        let outcome = self.apply_inner(req).instrument(span.clone()).await;
        record_outcome(&span, outcome);
        metrics::record_processed(&req, outcome);
        outcome
    }

    async fn apply_inner(&self, req: MoveRequest) -> MoveOutcome {
        // Index phase. The ID leaves the source before it joins the
        // destination: it may briefly be in neither set, never in both.
        if !self.index.remove(req.from, req.id) {
            debug!("item not in source stage, ignoring stale move");
            return MoveOutcome::Stale;
        }
        self.index.add(req.to, req.id);

        // Storage phase. A failure leaves the index in the post-move state.
        match self.store.rename(req.id, req.from, req.to).await {
            Ok(()) => {
                info!("item moved");
                MoveOutcome::Applied
            }
            Err(e) => {
                error!(
                    old = %self.store.path_for(req.from, req.id).display(),
                    new = %self.store.path_for(req.to, req.id).display(),
                    "move failed, index already updated: {e}"
                );
                MoveOutcome::StorageFailed
            }
        }
    }

    fn finish(&self, request: MoveRequest, outcome: MoveOutcome) {
        let seq = *self.processed.borrow() + 1;
        // Publish the event before the counter so a flushed caller sees it.
        // No subscribers is fine.
        let _ = self.events.send(MoveEvent {
            seq,
            request,
            outcome,
            processed_at: chrono::Utc::now(),
        });
        self.processed.send_replace(seq);
    }
}
