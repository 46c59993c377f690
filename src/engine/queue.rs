//! Bounded FIFO of move requests between request handlers and the processor.
//!
//! [`MoveQueue::enqueue`] waits for a free slot when the queue is full;
//! [`MoveQueue::try_enqueue`] fails with [`Error::QueueFull`] instead. Neither
//! ever drops a request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::{Error, Result};
use crate::model::MoveRequest;

/// Producer side of the move request queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MoveQueue {
    tx: mpsc::Sender<MoveRequest>,
    submitted: Arc<AtomicU64>,
}

/// Create a queue holding at most `capacity` pending requests.
pub(crate) fn channel(capacity: usize) -> (MoveQueue, mpsc::Receiver<MoveRequest>) {
    let (tx, rx) = mpsc::channel(capacity);
    let queue = MoveQueue {
        tx,
        submitted: Arc::new(AtomicU64::new(0)),
    };
    (queue, rx)
}

impl MoveQueue {
    /// Enqueue, waiting while the queue is full.
    pub async fn enqueue(&self, req: MoveRequest) -> Result<()> {
        self.tx.send(req).await.map_err(|_| Error::QueueClosed)?;
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Enqueue without waiting.
    pub fn try_enqueue(&self, req: MoveRequest) -> Result<()> {
        match self.tx.try_send(req) {
            Ok(()) => {
                self.submitted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(Error::QueueFull),
            Err(TrySendError::Closed(_)) => Err(Error::QueueClosed),
        }
    }

    /// Requests successfully enqueued so far.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
