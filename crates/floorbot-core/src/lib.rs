//! Concurrent scheduling core for a priority order-fulfillment floor.
//!
//! Orders arrive with a priority class (VIP before Normal, FIFO within a
//! class), a dynamically sized pool of bot workers claims and serves them
//! over a fixed tick countdown, and renderers observe everything through
//! consistent snapshots.
//!
//! ## Architecture
//!
//! - **Single lock domain**: one mutex guards the pending queue, the bot
//!   slots, and the completed list, so cross-list moves are atomic as
//!   observed and an order is always visible in exactly one place.
//! - **Permit-counted wakeups**: a semaphore holds one permit per pending
//!   order; each submit wakes at most one blocked claim, and the lock is
//!   never held across the wait.
//! - **Cooperative cancellation**: each worker gets a oneshot stop signal
//!   checked at the fetch boundary and once per countdown tick; removal
//!   joins the task and requeues whatever it was serving.
//!
//! ## Modules
//!
//! - `config`: floor timing parameters
//! - `order`: order records and priority classes
//! - `state`: the synchronized floor state
//! - `pool`: dynamic worker pool with tail-only removal
//! - `scheduler`: the facade consumed by drivers and renderers
//! - `snapshot`: serializable render views

pub mod config;
pub mod order;
pub mod pool;
pub mod scheduler;
pub mod snapshot;
pub mod state;

mod queue;
mod worker;

pub use config::{ConfigError, FloorConfig};
pub use order::{BotId, Order, OrderClass, OrderId};
pub use pool::{PoolError, WorkerPool};
pub use scheduler::Scheduler;
pub use snapshot::{BotActivity, BotStatusView, FloorSnapshot, OrderView};
pub use state::{EmptyTimeout, FloorState};
