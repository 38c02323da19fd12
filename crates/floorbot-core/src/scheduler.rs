//! Public facade composing the floor state and the worker pool.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::config::FloorConfig;
use crate::order::{BotId, OrderClass, OrderId};
use crate::pool::{PoolError, WorkerPool};
use crate::snapshot::FloorSnapshot;
use crate::state::FloorState;

/// Front door for the external driver and renderer.
///
/// Submit and snapshot are synchronous and cheap (one short critical
/// section). Add, remove, and shutdown are async because removal joins the
/// worker task; the pool sits behind an async mutex so those calls serialize
/// without blocking submitters or the renderer.
#[derive(Debug)]
pub struct Scheduler {
    floor: Arc<FloorState>,
    pool: Mutex<WorkerPool>,
}

impl Scheduler {
    pub fn new(config: FloorConfig) -> Self {
        let floor = FloorState::shared(config);
        let pool = Mutex::new(WorkerPool::new(Arc::clone(&floor)));
        Self { floor, pool }
    }

    /// Scheduler behind an `Arc`, ready to share between driver and
    /// renderer tasks.
    pub fn shared(config: FloorConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Submits an order of the given class. Always succeeds and returns the
    /// assigned id.
    pub fn submit_order(&self, class: OrderClass) -> OrderId {
        self.floor.submit(class)
    }

    /// Adds one bot to the pool and returns its id.
    pub async fn add_worker(&self) -> BotId {
        self.pool.lock().await.add_worker()
    }

    /// Removes the highest-id bot, waiting until its task has exited and
    /// its in-flight order (if any) is back on the queue.
    pub async fn remove_worker(&self) -> Result<(), PoolError> {
        self.pool.lock().await.remove_worker().await
    }

    /// Atomic-as-observed view of pending, completed, and per-bot state.
    pub fn snapshot(&self) -> FloorSnapshot {
        self.floor.snapshot()
    }

    /// Stops every bot (tail first, joining each) and leaves the queue
    /// as-is. Orders still pending or requeued at this point are simply not
    /// processed further.
    pub async fn shutdown(&self) {
        self.pool.lock().await.drain().await;

        info!(
            pending = self.floor.pending_len(),
            completed = self.floor.completed_len(),
            "floor shut down"
        );
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.floor.bot_count()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.floor.pending_len()
    }

    #[inline]
    pub fn completed_count(&self) -> usize {
        self.floor.completed_len()
    }
}
