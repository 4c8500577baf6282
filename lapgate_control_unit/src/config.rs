//! TOML configuration for the control unit.
//!
//! One file, five tables. Only `[shared]` is required; everything else
//! falls back to the defaults in `lapgate_common::consts`.
//!
//! ```toml
//! [shared]
//! service_name = "lapgate-01"
//!
//! [control]
//! cycle_time_ms = 5
//! store_path = "lapgate.target"
//!
//! [timing]
//! min_lap_ms = 2000
//!
//! [sensor]
//! lap_threshold = 800
//! sync_threshold = 900
//!
//! [simulation]
//! cars_start_ms = 9000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lapgate_common::config::{ConfigError, ConfigLoader, SharedConfig};
use lapgate_common::consts::{CYCLE_TIME_MS, CYCLE_TIME_MS_MAX, CYCLE_TIME_MS_MIN, DEFAULT_STORE_PATH};
use lapgate_common::race::config::{SensorConfig, TimingConfig};
use lapgate_hal::SimulationConfig;

/// `[control]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Control cycle period [ms].
    pub cycle_time_ms: u64,
    /// File holding the persisted target lap count.
    pub store_path: PathBuf,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cycle_time_ms: CYCLE_TIME_MS,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(CYCLE_TIME_MS_MIN..=CYCLE_TIME_MS_MAX).contains(&self.cycle_time_ms) {
            return Err(ConfigError::ValidationError(format!(
                "cycle_time_ms {} out of range [{CYCLE_TIME_MS_MIN}, {CYCLE_TIME_MS_MAX}]",
                self.cycle_time_ms
            )));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "store_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete control-unit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapGateConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl LapGateConfig {
    /// Validate every table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.control.validate()?;
        self.timing.validate()?;
        self.sensor.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

/// Load and validate the configuration file.
pub fn load_config(path: &Path) -> Result<LapGateConfig, ConfigError> {
    let config = LapGateConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LapGateConfig, ConfigError> {
    let config = LapGateConfig::from_toml_str(content)?;
    config.validate()?;
    Ok(config)
}

// ─── Tests ──────────────────────────────────────────────────────────
