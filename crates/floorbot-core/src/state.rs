//! Shared floor state: pending queue, bot slots, and completed orders.
//!
//! One mutex guards all three, so a submitted order is always visible in
//! exactly one place (pending, a bot slot, or completed) no matter how the
//! snapshot interleaves with bot activity. The mutex is never held across an
//! await: the only suspension in here is the bounded wait for a queue permit,
//! taken before the lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::FloorConfig;
use crate::order::{BotId, Order, OrderClass, OrderId};
use crate::queue::PendingQueue;
use crate::snapshot::{BotActivity, BotStatusView, FloorSnapshot, OrderView};

/// The queue stayed empty for the whole bounded wait.
///
/// Recovered locally by the worker loop (stay idle, retry); never crosses
/// the facade.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no pending order within {0:?}")]
pub struct EmptyTimeout(pub Duration);

/// An order a bot is currently serving.
#[derive(Debug)]
struct InFlight {
    order: Order,
    seconds_left: u32,
}

/// One bot's slot on the status board. `current: None` renders as `Idle`.
#[derive(Debug)]
struct BotSlot {
    id: BotId,
    current: Option<InFlight>,
}

impl BotSlot {
    fn activity(&self) -> BotActivity {
        match &self.current {
            Some(in_flight) => BotActivity::Processing {
                order_id: in_flight.order.id,
                class: in_flight.order.class,
                seconds_left: in_flight.seconds_left,
            },
            None => BotActivity::Idle,
        }
    }
}

#[derive(Debug, Default)]
struct FloorInner {
    pending: PendingQueue,
    bots: Vec<BotSlot>,
    completed: Vec<Order>,
}

impl FloorInner {
    fn slot_mut(&mut self, bot_id: BotId) -> Option<&mut BotSlot> {
        // Ids are positional and removal is tail-only, so id N lives at
        // index N - 1 for its whole life.
        self.bots.get_mut(bot_id.wrapping_sub(1))
    }
}

/// The single synchronized component owning the pending queue, the per-bot
/// slots, and the completed list.
///
/// Collaborators never touch the containers directly; every operation here
/// is one critical section, so cross-list moves (claim, complete, reclaim)
/// are atomic as observed by [`FloorState::snapshot`].
///
/// Queue wakeups ride a counting semaphore holding one permit per pending
/// order: each push releases at most one blocked claim, and a claim that
/// wins a permit always finds an order to pop.
#[derive(Debug)]
pub struct FloorState {
    config: FloorConfig,
    inner: Mutex<FloorInner>,
    ready: Semaphore,
    next_order_id: AtomicU64,
}

impl FloorState {
    pub fn new(config: FloorConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(FloorInner::default()),
            ready: Semaphore::new(0),
            next_order_id: AtomicU64::new(1),
        }
    }

    /// New floor behind an `Arc`, ready to share with workers.
    pub fn shared(config: FloorConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    #[inline]
    pub fn config(&self) -> &FloorConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Order lifecycle
    // ------------------------------------------------------------------

    /// Allocates the next order id, enqueues the order, and wakes at most
    /// one blocked claim. Never blocks, never fails.
    pub fn submit(&self, class: OrderClass) -> OrderId {
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let order = Order::new(id, class);

        {
            let mut inner = self.inner.lock();
            inner.pending.push(order);
        }
        // Permit after insert: a claim that wins this permit is guaranteed
        // to find the order.
        self.ready.add_permits(1);

        info!(order_id = id, class = %class, "order submitted");
        id
    }

    /// Takes the next order in serve order and marks it as `bot_id`'s
    /// current order, in one critical section. Waits up to the configured
    /// fetch timeout when the queue is empty.
    pub async fn claim_next(&self, bot_id: BotId) -> Result<Order, EmptyTimeout> {
        let wait = self.config.fetch_timeout;
        let Ok(acquired) = tokio::time::timeout(wait, self.ready.acquire()).await else {
            return Err(EmptyTimeout(wait));
        };
        // The permit semaphore is never closed while the floor exists.
        let permit = acquired.expect("queue permit semaphore closed");

        let order = {
            let mut inner = self.inner.lock();
            let order = inner
                .pending
                .pop_first()
                .expect("a queue permit implies a pending order");
            if let Some(slot) = inner.slot_mut(bot_id) {
                slot.current = Some(InFlight {
                    order: order.clone(),
                    seconds_left: self.config.service_ticks,
                });
            }
            order
        };
        permit.forget();

        info!(bot_id, order_id = order.id, class = %order.class, "order claimed");
        Ok(order)
    }

    /// Publishes the remaining service time for `bot_id`'s current order.
    pub fn record_tick(&self, bot_id: BotId, seconds_left: u32) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.slot_mut(bot_id) {
            if let Some(in_flight) = slot.current.as_mut() {
                in_flight.seconds_left = seconds_left;
                debug!(bot_id, order_id = in_flight.order.id, seconds_left, "tick");
            }
        }
    }

    /// Moves `bot_id`'s current order to the completed list and clears the
    /// slot, in one critical section. Returns the completed order.
    pub fn complete_current(&self, bot_id: BotId) -> Option<Order> {
        let completed = {
            let mut inner = self.inner.lock();
            let in_flight = inner.slot_mut(bot_id)?.current.take()?;
            inner.completed.push(in_flight.order.clone());
            in_flight.order
        };

        info!(bot_id, order_id = completed.id, class = %completed.class, "order completed");
        Some(completed)
    }

    /// Pushes `bot_id`'s current order back onto the pending queue with its
    /// original class and a fresh countdown, clearing the slot. Used at the
    /// fetch-boundary cancellation race and on worker removal.
    pub fn reclaim_current(&self, bot_id: BotId) -> Option<OrderId> {
        let reclaimed = {
            let mut inner = self.inner.lock();
            let in_flight = inner.slot_mut(bot_id)?.current.take()?;
            let id = in_flight.order.id;
            inner.pending.push(in_flight.order);
            id
        };
        self.ready.add_permits(1);

        info!(bot_id, order_id = reclaimed, "order returned to queue");
        Some(reclaimed)
    }

    // ------------------------------------------------------------------
    // Bot slots
    // ------------------------------------------------------------------

    /// Appends an idle slot and returns its id (`pool size + 1`).
    pub fn attach_bot(&self) -> BotId {
        let mut inner = self.inner.lock();
        let id = inner.bots.len() + 1;
        inner.bots.push(BotSlot { id, current: None });
        id
    }

    /// Removes the tail slot, requeueing its in-flight order if the worker
    /// stopped mid-service. Returns the requeued order id, if any.
    ///
    /// Only ever called for the highest id, after the worker task has fully
    /// exited.
    pub fn release_bot(&self, bot_id: BotId) -> Option<OrderId> {
        let reclaimed = {
            let mut inner = self.inner.lock();
            let slot = inner.bots.pop()?;
            debug_assert_eq!(slot.id, bot_id, "bot removal must take the tail slot");
            match slot.current {
                Some(in_flight) => {
                    let id = in_flight.order.id;
                    inner.pending.push(in_flight.order);
                    Some(id)
                }
                None => None,
            }
        };

        if let Some(order_id) = reclaimed {
            self.ready.add_permits(1);
            info!(bot_id, order_id, "order returned to queue");
        }
        reclaimed
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Atomic-as-observed view of pending, completed, and per-bot state.
    pub fn snapshot(&self) -> FloorSnapshot {
        let inner = self.inner.lock();
        FloorSnapshot {
            timestamp: chrono::Utc::now(),
            pending: inner.pending.peek_all().iter().map(OrderView::from).collect(),
            completed: inner.completed.iter().map(OrderView::from).collect(),
            bots: inner
                .bots
                .iter()
                .map(|slot| BotStatusView {
                    id: slot.id,
                    activity: slot.activity(),
                })
                .collect(),
        }
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    #[inline]
    pub fn completed_len(&self) -> usize {
        self.inner.lock().completed.len()
    }

    #[inline]
    pub fn bot_count(&self) -> usize {
        self.inner.lock().bots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> FloorConfig {
        FloorConfig {
            service_ticks: 4,
            tick: Duration::from_millis(10),
            fetch_timeout: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_submit_assigns_monotonic_ids() {
        let state = FloorState::new(fast_config());
        assert_eq!(state.submit(OrderClass::Normal), 1);
        assert_eq!(state.submit(OrderClass::Vip), 2);
        assert_eq!(state.submit(OrderClass::Normal), 3);
        assert_eq!(state.pending_len(), 3);

        let pending: Vec<u64> = state.snapshot().pending.iter().map(|o| o.id).collect();
        assert_eq!(pending, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_claim_times_out_on_empty_queue() {
        let state = FloorState::new(fast_config());
        state.attach_bot();

        let err = state.claim_next(1).await.unwrap_err();
        assert_eq!(err, EmptyTimeout(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_claim_moves_order_into_slot() {
        let state = FloorState::new(fast_config());
        state.attach_bot();
        state.submit(OrderClass::Normal);
        state.submit(OrderClass::Vip);

        let order = state.claim_next(1).await.unwrap();
        assert_eq!(order.id, 2);

        let snapshot = state.snapshot();
        let pending: Vec<u64> = snapshot.pending.iter().map(|o| o.id).collect();
        assert_eq!(pending, vec![1]);
        assert_eq!(snapshot.in_flight(), vec![2]);
        assert_eq!(
            snapshot.bots[0].activity,
            BotActivity::Processing {
                order_id: 2,
                class: OrderClass::Vip,
                seconds_left: 4,
            }
        );
    }

    #[tokio::test]
    async fn test_complete_moves_order_to_completed() {
        let state = FloorState::new(fast_config());
        state.attach_bot();
        state.submit(OrderClass::Normal);

        state.claim_next(1).await.unwrap();
        let completed = state.complete_current(1).unwrap();
        assert_eq!(completed.id, 1);

        let snapshot = state.snapshot();
        assert!(snapshot.pending.is_empty());
        assert!(snapshot.in_flight().is_empty());
        assert_eq!(snapshot.completed[0].id, 1);
        assert_eq!(snapshot.bots[0].activity, BotActivity::Idle);

        // Nothing left to complete.
        assert!(state.complete_current(1).is_none());
    }

    #[tokio::test]
    async fn test_reclaim_restarts_countdown_from_full() {
        let state = FloorState::new(fast_config());
        state.attach_bot();
        state.submit(OrderClass::Vip);

        state.claim_next(1).await.unwrap();
        state.record_tick(1, 1);
        assert_eq!(state.reclaim_current(1), Some(1));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.pending[0].id, 1);
        assert_eq!(snapshot.pending[0].class, OrderClass::Vip);
        assert_eq!(snapshot.bots[0].activity, BotActivity::Idle);

        // Re-claimed orders start over; the 3 spent ticks are discarded.
        state.claim_next(1).await.unwrap();
        match state.snapshot().bots[0].activity {
            BotActivity::Processing { seconds_left, .. } => assert_eq!(seconds_left, 4),
            BotActivity::Idle => panic!("order should be in flight"),
        }
    }

    #[tokio::test]
    async fn test_two_claims_one_order() {
        let state = Arc::new(FloorState::new(fast_config()));
        state.attach_bot();
        state.attach_bot();
        state.submit(OrderClass::Normal);

        let (first, second) = tokio::join!(state.claim_next(1), state.claim_next(2));
        assert!(first.is_ok() ^ second.is_ok(), "exactly one claim must win");

        let snapshot = state.snapshot();
        assert!(snapshot.pending.is_empty());
        assert_eq!(snapshot.in_flight(), vec![1]);
    }

    #[tokio::test]
    async fn test_release_bot_requeues_in_flight_order() {
        let state = FloorState::new(fast_config());
        state.attach_bot();
        state.submit(OrderClass::Normal);
        state.claim_next(1).await.unwrap();

        assert_eq!(state.release_bot(1), Some(1));
        assert_eq!(state.bot_count(), 0);
        assert_eq!(state.pending_len(), 1);

        // Idle bots release without touching the queue.
        let id = state.attach_bot();
        assert_eq!(id, 1);
        assert_eq!(state.release_bot(1), None);
        assert_eq!(state.pending_len(), 1);
    }

    #[test]
    fn test_attach_ids_are_contiguous() {
        let state = FloorState::new(fast_config());
        assert_eq!(state.attach_bot(), 1);
        assert_eq!(state.attach_bot(), 2);
        assert_eq!(state.attach_bot(), 3);

        state.release_bot(3);
        assert_eq!(state.attach_bot(), 3);
    }

    #[tokio::test]
    async fn test_order_ids_conserved_across_moves() {
        let state = FloorState::new(fast_config());
        state.attach_bot();
        for class in [OrderClass::Normal, OrderClass::Vip, OrderClass::Normal] {
            state.submit(class);
        }

        state.claim_next(1).await.unwrap();
        let mut ids = state.snapshot().all_order_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);

        state.complete_current(1);
        state.claim_next(1).await.unwrap();
        let mut ids = state.snapshot().all_order_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
