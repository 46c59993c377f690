//! Engine: composition root for the stage index, storage, move queue and
//! move processor.
//!
//! Request handlers hold a cloned [`Engine`]. They submit moves and read
//! items but never touch the index directly; the [`MoveProcessor`] returned
//! alongside the engine is the only writer.

pub mod processor;
pub mod queue;

pub use processor::MoveProcessor;
pub use queue::MoveQueue;

use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::event::MoveEvent;
use crate::index::StageIndex;
use crate::model::{Item, ItemId, MoveRequest, Stage};
use crate::storage::StageStore;
use crate::telemetry::metrics;

const EVENT_BUFFER: usize = 1024;

#[derive(Clone)]
pub struct Engine {
    index: Arc<StageIndex>,
    store: Arc<StageStore>,
    queue: MoveQueue,
    processed: watch::Receiver<u64>,
    events: broadcast::Sender<MoveEvent>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl Engine {
    /// Build an engine with an empty index and a queue of `capacity` slots.
    ///
    /// The returned processor must be run (usually via
    /// [`MoveProcessor::spawn`]) for submitted moves to take effect.
    pub fn new(store: StageStore, capacity: usize) -> Result<(Self, MoveProcessor)> {
        if capacity == 0 {
            return Err(Error::Config(
                "queue capacity must be greater than zero".to_string(),
            ));
        }

        let index = Arc::new(StageIndex::new());
        let store = Arc::new(store);
        let (queue, rx) = queue::channel(capacity);
        let (processed_tx, processed_rx) = watch::channel(0);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let shutdown = Arc::new(watch::channel(false).0);

        let processor = MoveProcessor::new(
            rx,
            Arc::clone(&index),
            Arc::clone(&store),
            Arc::clone(&shutdown),
            processed_tx,
            events.clone(),
        );

        let engine = Self {
            index,
            store,
            queue,
            processed: processed_rx,
            events,
            shutdown,
        };
        Ok((engine, processor))
    }

    /// Create the stage directories, then seed the index from their contents.
    pub async fn bootstrap(store: StageStore, capacity: usize) -> Result<(Self, MoveProcessor)> {
        store.ensure_layout().await?;
        let (engine, processor) = Self::new(store, capacity)?;

        for stage in Stage::ALL {
            let ids = engine.store.scan(stage).await;
            let found = ids.len();
            let seeded = engine.seed(stage, ids);
            info!(%stage, found, seeded, "stage seeded");
        }

        Ok((engine, processor))
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    /// Populate `stage` with IDs found at startup. Returns how many were
    /// added; IDs already indexed in another stage are skipped.
    pub fn seed(&self, stage: Stage, ids: impl IntoIterator<Item = ItemId>) -> usize {
        self.index.seed(stage, ids)
    }

    // -----------------------------------------------------------------------
    // Producers
    // -----------------------------------------------------------------------

    /// Queue a move, waiting for a free slot if the queue is full.
    ///
    /// Returns once the request is queued, not once it is applied. A move for
    /// an ID that is no longer in `req.from` is silently ignored by the
    /// processor.
    pub async fn submit(&self, req: MoveRequest) -> Result<()> {
        check_transition(&req)?;
        let result = self.queue.enqueue(req).await;
        metrics::record_submitted(&req, submit_label(&result));
        result
    }

    /// Queue a move, failing with [`Error::QueueFull`] instead of waiting.
    pub fn try_submit(&self, req: MoveRequest) -> Result<()> {
        check_transition(&req)?;
        let result = self.queue.try_enqueue(req);
        metrics::record_submitted(&req, submit_label(&result));
        result
    }

    // -----------------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------------

    /// Load an item's content from `stage`.
    ///
    /// Fails with [`Error::NotFound`] if the ID is not in `stage`. A move can
    /// land between the membership check and the read, so an I/O error here
    /// is an expected outcome under concurrency.
    pub async fn load(&self, id: ItemId, stage: Stage) -> Result<Item> {
        if !self.index.contains(stage, id) {
            metrics::record_load(stage, "not_found");
            return Err(Error::NotFound { id, stage });
        }

        match self.store.read(stage, id).await {
            Ok(body) => {
                metrics::record_load(stage, "ok");
                Ok(Item { id, stage, body })
            }
            Err(e) => {
                warn!(%id, %stage, "read failed after membership check: {e}");
                metrics::record_load(stage, "io_error");
                Err(e)
            }
        }
    }

    /// Some item currently in `stage`, or `None` if the stage is empty.
    pub fn pick_any(&self, stage: Stage) -> Option<ItemId> {
        self.index.pick_any(stage)
    }

    pub fn contains(&self, stage: Stage, id: ItemId) -> bool {
        self.index.contains(stage, id)
    }

    /// Item count per stage, in [`Stage::ALL`] order.
    pub fn counts(&self) -> Vec<(Stage, usize)> {
        Stage::ALL
            .into_iter()
            .map(|stage| (stage, self.index.len(stage)))
            .collect()
    }

    pub fn index(&self) -> &StageIndex {
        &self.index
    }

    pub fn store(&self) -> &StageStore {
        &self.store
    }

    pub fn queue(&self) -> &MoveQueue {
        &self.queue
    }

    // -----------------------------------------------------------------------
    // Coordination
    // -----------------------------------------------------------------------

    /// Subscribe to processed-move events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MoveEvent> {
        self.events.subscribe()
    }

    /// Wait until every request queued before this call has been processed.
    ///
    /// Fails with [`Error::QueueClosed`] if the processor stops first. Never
    /// returns if the processor was not started.
    pub async fn flush(&self) -> Result<()> {
        let target = self.queue.submitted();
        let mut processed = self.processed.clone();
        processed
            .wait_for(|n| *n >= target)
            .await
            .map_err(|_| Error::QueueClosed)?;
        Ok(())
    }

    /// Signal the move processor (and anything awaiting [`Engine::stopped`])
    /// to stop. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Resolves once [`Engine::shutdown`] has been called.
    pub fn stopped(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.shutdown.subscribe();
        async move {
            let _ = rx.wait_for(|stopped| *stopped).await;
        }
    }
}

fn check_transition(req: &MoveRequest) -> Result<()> {
    if req.is_valid() {
        Ok(())
    } else {
        metrics::record_submitted(req, "invalid");
        Err(Error::InvalidTransition {
            from: req.from,
            to: req.to,
        })
    }
}

fn submit_label(result: &Result<()>) -> &'static str {
    match result {
        Ok(()) => "ok",
        Err(Error::QueueFull) => "full",
        Err(Error::QueueClosed) => "closed",
        Err(_) => "error",
    }
}
