//! Configuration for the floorbot binary.
//!
//! Layering order: TOML file, then `FLOORBOT_*` environment overrides, then
//! CLI overrides, then `validate()`. The core library only sees the final
//! [`FloorConfig`] produced by [`FloorbotConfig::floor_config`].

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use floorbot_core::FloorConfig;
use serde::Deserialize;

/// Resolved configuration for the floorbot binary.
#[derive(Debug, Clone)]
pub struct FloorbotConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,

    /// Bots spawned before the driver takes over.
    pub initial_bots: usize,

    /// Floor timing.
    pub floor: FloorTimingConfig,

    /// Renderer settings.
    pub render: RenderConfig,
}

/// Floor timing in config-file units.
#[derive(Debug, Clone)]
pub struct FloorTimingConfig {
    /// Countdown length in ticks.
    pub service_ticks: u32,

    /// One countdown tick, in milliseconds.
    pub tick_ms: u64,

    /// How long an idle bot waits for work, in milliseconds.
    pub fetch_timeout_ms: u64,
}

/// Renderer settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Redraw interval in milliseconds.
    pub interval_ms: u64,

    /// Emit snapshots as JSON lines instead of redrawing the screen.
    pub json: bool,
}

impl Default for FloorbotConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            initial_bots: 0,
            floor: FloorTimingConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for FloorTimingConfig {
    fn default() -> Self {
        Self {
            service_ticks: 10,
            tick_ms: 1_000, // one tick per second
            fetch_timeout_ms: 5_000,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            json: false,
        }
    }
}

impl FloorbotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TomlConfig = toml::from_str(content).context("Failed to parse TOML config")?;
        Ok(Self::from(file))
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("FLOORBOT_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(tick) = std::env::var("FLOORBOT_TICK_MS") {
            if let Ok(tick_ms) = tick.parse() {
                self.floor.tick_ms = tick_ms;
            }
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_cli_overrides(
        &mut self,
        log_level: Option<String>,
        bots: Option<usize>,
        render_interval_ms: Option<u64>,
        json: bool,
    ) {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if let Some(bots) = bots {
            self.initial_bots = bots;
        }
        if let Some(interval) = render_interval_ms {
            self.render.interval_ms = interval;
        }
        if json {
            self.render.json = true;
        }
    }

    /// Validate configuration and return errors for unusable values.
    pub fn validate(&self) -> Result<()> {
        if self.floor.service_ticks == 0 {
            bail!("service_ticks must be at least 1");
        }
        if self.floor.tick_ms == 0 {
            bail!("tick_ms must be positive");
        }
        if self.floor.fetch_timeout_ms == 0 {
            bail!("fetch_timeout_ms must be positive");
        }
        if self.render.interval_ms == 0 {
            bail!("render interval_ms must be positive");
        }
        Ok(())
    }

    /// The timing config handed to the scheduling core.
    pub fn floor_config(&self) -> FloorConfig {
        FloorConfig {
            service_ticks: self.floor.service_ticks,
            tick: Duration::from_millis(self.floor.tick_ms),
            fetch_timeout: Duration::from_millis(self.floor.fetch_timeout_ms),
        }
    }
}

// ============================================================================
// TOML deserialization structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    general: GeneralToml,
    #[serde(default)]
    floor: FloorToml,
    #[serde(default)]
    render: RenderToml,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GeneralToml {
    log_level: String,
    initial_bots: usize,
}

impl Default for GeneralToml {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            initial_bots: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FloorToml {
    service_ticks: u32,
    tick_ms: u64,
    fetch_timeout_ms: u64,
}

impl Default for FloorToml {
    fn default() -> Self {
        let defaults = FloorTimingConfig::default();
        Self {
            service_ticks: defaults.service_ticks,
            tick_ms: defaults.tick_ms,
            fetch_timeout_ms: defaults.fetch_timeout_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RenderToml {
    interval_ms: u64,
    json: bool,
}

impl Default for RenderToml {
    fn default() -> Self {
        let defaults = RenderConfig::default();
        Self {
            interval_ms: defaults.interval_ms,
            json: defaults.json,
        }
    }
}

impl From<TomlConfig> for FloorbotConfig {
    fn from(toml: TomlConfig) -> Self {
        Self {
            log_level: toml.general.log_level,
            initial_bots: toml.general.initial_bots,
            floor: FloorTimingConfig {
                service_ticks: toml.floor.service_ticks,
                tick_ms: toml.floor.tick_ms,
                fetch_timeout_ms: toml.floor.fetch_timeout_ms,
            },
            render: RenderConfig {
                interval_ms: toml.render.interval_ms,
                json: toml.render.json,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FloorbotConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.initial_bots, 0);
        assert_eq!(config.floor.service_ticks, 10);
        assert_eq!(config.floor.tick_ms, 1_000);
        assert_eq!(config.floor.fetch_timeout_ms, 5_000);
        assert_eq!(config.render.interval_ms, 1_000);
        assert!(!config.render.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FloorbotConfig::from_toml_str(
            r#"
            [floor]
            service_ticks = 3
            tick_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.floor.service_ticks, 3);
        assert_eq!(config.floor.tick_ms, 50);
        assert_eq!(config.floor.fetch_timeout_ms, 5_000);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_full_toml_round_trip() {
        let config = FloorbotConfig::from_toml_str(
            r#"
            [general]
            log_level = "debug"
            initial_bots = 2

            [floor]
            service_ticks = 5
            tick_ms = 200
            fetch_timeout_ms = 800

            [render]
            interval_ms = 250
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.initial_bots, 2);
        assert_eq!(config.floor.service_ticks, 5);
        assert_eq!(config.render.interval_ms, 250);
        assert!(config.render.json);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(FloorbotConfig::from_toml_str("not toml at all [").is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = FloorbotConfig::default();
        config.apply_cli_overrides(Some("debug".to_string()), Some(4), Some(500), true);

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.initial_bots, 4);
        assert_eq!(config.render.interval_ms, 500);
        assert!(config.render.json);
    }

    #[test]
    fn test_validate_rejects_zero_timing() {
        let mut config = FloorbotConfig::default();
        config.floor.tick_ms = 0;
        assert!(config.validate().is_err());

        let mut config = FloorbotConfig::default();
        config.floor.service_ticks = 0;
        assert!(config.validate().is_err());

        let mut config = FloorbotConfig::default();
        config.render.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_floor_config_conversion() {
        let mut config = FloorbotConfig::default();
        config.floor.service_ticks = 4;
        config.floor.tick_ms = 25;
        config.floor.fetch_timeout_ms = 100;

        let floor = config.floor_config();
        assert_eq!(floor.service_ticks, 4);
        assert_eq!(floor.tick, Duration::from_millis(25));
        assert_eq!(floor.fetch_timeout, Duration::from_millis(100));
    }
}
