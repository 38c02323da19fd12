//! Bot worker task: the fetch/serve loop.
//!
//! ```text
//!          claim timeout (retry)
//!            +-----------+
//!            v           |
//!   start -> Idle -> Fetching -> Processing -> Completing -> Idle
//!                        |            |
//!                 (stop: requeue)  (stop: leave slot)
//!                        |            |
//!                        +--> Stopped <--+
//! ```
//!
//! The stop signal is a per-worker oneshot checked at exactly two points:
//! the fetch boundary (where a just-claimed order is handed back) and once
//! per countdown tick. An order interrupted mid-service stays in the bot's
//! slot; the pool requeues it after joining the task.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::order::{BotId, OrderId};
use crate::state::FloorState;

/// Pool-side handle to a spawned worker.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    pub id: BotId,
    pub stop_tx: oneshot::Sender<()>,
    pub handle: JoinHandle<()>,
}

/// One bot's fetch/serve loop. Owns nothing but its id, its stop receiver,
/// and a reference to the floor.
struct BotWorker {
    id: BotId,
    floor: Arc<FloorState>,
    stop_rx: oneshot::Receiver<()>,
}

/// Spawns the worker task for an already-attached bot slot.
pub(crate) fn spawn_worker(id: BotId, floor: Arc<FloorState>) -> WorkerHandle {
    let (stop_tx, stop_rx) = oneshot::channel();
    let worker = BotWorker { id, floor, stop_rx };
    let handle = tokio::spawn(worker.run());
    WorkerHandle { id, stop_tx, handle }
}

impl BotWorker {
    async fn run(mut self) {
        info!(bot_id = self.id, "bot started");

        loop {
            tokio::select! {
                _ = &mut self.stop_rx => {
                    debug!(bot_id = self.id, "stop while idle");
                    break;
                }
                claimed = self.floor.claim_next(self.id) => {
                    match claimed {
                        Ok(order) => {
                            // The stop signal may have fired while the claim
                            // was in progress; hand the order back instead
                            // of serving it.
                            if self.stop_requested() {
                                self.floor.reclaim_current(self.id);
                                break;
                            }
                            if !self.serve(order.id).await {
                                break;
                            }
                        }
                        // Nothing to do; stay idle and retry.
                        Err(_) => continue,
                    }
                }
            }
        }

        info!(bot_id = self.id, "bot stopped");
    }

    /// Runs the fixed countdown for the order in this bot's slot.
    ///
    /// Returns `false` when the stop signal interrupted the countdown; the
    /// order then stays in the slot for the pool to reconcile.
    async fn serve(&mut self, order_id: OrderId) -> bool {
        let tick = self.floor.config().tick;
        let mut seconds_left = self.floor.config().service_ticks;

        while seconds_left > 0 {
            tokio::select! {
                _ = &mut self.stop_rx => {
                    debug!(bot_id = self.id, order_id, seconds_left, "stop during service");
                    return false;
                }
                _ = tokio::time::sleep(tick) => {
                    seconds_left -= 1;
                    if seconds_left == 0 {
                        self.floor.complete_current(self.id);
                    } else {
                        self.floor.record_tick(self.id, seconds_left);
                    }
                }
            }
        }
        true
    }

    /// Non-blocking stop check for the fetch boundary. A dropped sender
    /// counts as a stop so workers never outlive their pool.
    fn stop_requested(&mut self) -> bool {
        !matches!(
            self.stop_rx.try_recv(),
            Err(oneshot::error::TryRecvError::Empty)
        )
    }
}
