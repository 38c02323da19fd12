//! Dynamic worker pool: tail-only add and remove over the floor's bot slots.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::order::BotId;
use crate::state::FloorState;
use crate::worker::{WorkerHandle, spawn_worker};

/// Errors surfaced by pool operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Removal requested on an empty pool. A no-op signal, not fatal.
    #[error("no workers to remove")]
    NoWorkers,
}

/// The set of live bot workers.
///
/// Ids are positional: adding appends id `pool size + 1`, removal always
/// takes the highest id. Live ids therefore stay contiguous `1..=N` and
/// never renumber. There is no upper bound on pool size.
#[derive(Debug)]
pub struct WorkerPool {
    floor: Arc<FloorState>,
    workers: Vec<WorkerHandle>,
}

impl WorkerPool {
    pub fn new(floor: Arc<FloorState>) -> Self {
        Self {
            floor,
            workers: Vec::new(),
        }
    }

    /// Attaches a status slot and spawns its worker task. Returns the new
    /// bot id.
    pub fn add_worker(&mut self) -> BotId {
        let id = self.floor.attach_bot();
        debug_assert_eq!(id, self.workers.len() + 1);
        self.workers.push(spawn_worker(id, Arc::clone(&self.floor)));

        info!(bot_id = id, workers = self.workers.len(), "bot added");
        id
    }

    /// Stops the highest-id worker, waits until its task has fully exited,
    /// requeues its in-flight order (if any), and drops its status slot.
    ///
    /// Does not return until the worker is gone; the wait is bounded by one
    /// tick plus the fetch-timeout granularity.
    pub async fn remove_worker(&mut self) -> Result<(), PoolError> {
        let WorkerHandle {
            id,
            stop_tx,
            handle,
        } = self.workers.pop().ok_or(PoolError::NoWorkers)?;

        // A worker that already exited has dropped its receiver; the failed
        // send is fine either way.
        let _ = stop_tx.send(());
        if let Err(e) = handle.await {
            warn!(bot_id = id, error = %e, "worker task panicked before join");
        }

        self.floor.release_bot(id);
        info!(bot_id = id, workers = self.workers.len(), "bot removed");
        Ok(())
    }

    /// Removes every worker, highest id first. Requeued in-flight orders are
    /// left on the queue.
    pub async fn drain(&mut self) {
        while self.remove_worker().await.is_ok() {}
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
