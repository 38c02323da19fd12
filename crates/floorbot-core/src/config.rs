//! Floor timing configuration.

use std::time::Duration;

use thiserror::Error;

/// Rejected floor configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("service_ticks must be at least 1")]
    ZeroServiceTicks,

    #[error("tick duration must be non-zero")]
    ZeroTick,

    #[error("fetch timeout must be non-zero")]
    ZeroFetchTimeout,
}

/// Timing parameters shared by every bot on the floor.
///
/// Defaults are a 10-tick service countdown at one second per tick and a
/// 5-second bounded wait on an empty queue. Tests shrink the durations to
/// keep scenarios fast.
#[derive(Debug, Clone)]
pub struct FloorConfig {
    /// Number of countdown ticks one order takes to serve.
    pub service_ticks: u32,

    /// Wall-clock length of one countdown tick.
    pub tick: Duration,

    /// How long an idle bot waits for work before giving up and retrying.
    pub fetch_timeout: Duration,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            service_ticks: 10,
            tick: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

impl FloorConfig {
    /// Rejects configurations the worker loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_ticks == 0 {
            return Err(ConfigError::ZeroServiceTicks);
        }
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroFetchTimeout);
        }
        Ok(())
    }
}
