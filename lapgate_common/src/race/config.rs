//! Race configuration structures.
//!
//! `TimingConfig` and `SensorConfig` are loaded from TOML; every field is
//! optional and falls back to the constants in [`crate::consts`].
//! `RaceConfig` is the single persisted value (target lap count).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ConfigError;
use crate::consts::{
    FALSE_START_HOLD_MS, GATE_LOST_TIMEOUT_MS, LAP_THRESHOLD, MIN_LAP_DURATION_MS,
    SENSOR_RAW_MAX, SLEEP_TIMEOUT_MS, SYNC_STABLE_WINDOW_MS, SYNC_THRESHOLD, TARGET_LAPS_MAX,
    WARMUP_DURATION_MS,
};

// ─── Timing ─────────────────────────────────────────────────────────

/// Race timing windows [ms].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Debounce window for lap registration.
    pub min_lap_ms: u64,
    /// No Clear reading for this long → forced Sync.
    pub gate_lost_timeout_ms: u64,
    /// Continuous baseline required to leave Sync.
    pub sync_stable_ms: u64,
    /// Countdown length.
    pub warmup_ms: u64,
    /// FalseStart → Wait delay.
    pub false_start_hold_ms: u64,
    /// Inactivity → Sleep delay.
    pub sleep_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_lap_ms: MIN_LAP_DURATION_MS,
            gate_lost_timeout_ms: GATE_LOST_TIMEOUT_MS,
            sync_stable_ms: SYNC_STABLE_WINDOW_MS,
            warmup_ms: WARMUP_DURATION_MS,
            false_start_hold_ms: FALSE_START_HOLD_MS,
            sleep_timeout_ms: SLEEP_TIMEOUT_MS,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("min_lap_ms", self.min_lap_ms),
            ("gate_lost_timeout_ms", self.gate_lost_timeout_ms),
            ("sync_stable_ms", self.sync_stable_ms),
            ("warmup_ms", self.warmup_ms),
            ("false_start_hold_ms", self.false_start_hold_ms),
            ("sleep_timeout_ms", self.sleep_timeout_ms),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }
}

// ─── Sensor calibration ─────────────────────────────────────────────

/// Gate thresholds. Tunable per installation; field calibration decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Below → Blocked while timing.
    pub lap_threshold: u16,
    /// At or above → stable baseline while syncing.
    pub sync_threshold: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            lap_threshold: LAP_THRESHOLD,
            sync_threshold: SYNC_THRESHOLD,
        }
    }
}

impl SensorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_threshold > SENSOR_RAW_MAX {
            return Err(ConfigError::ValidationError(format!(
                "sync_threshold {} exceeds sensor range [0, {}]",
                self.sync_threshold, SENSOR_RAW_MAX
            )));
        }
        if self.lap_threshold >= self.sync_threshold {
            return Err(ConfigError::ValidationError(format!(
                "lap_threshold {} must be below sync_threshold {}",
                self.lap_threshold, self.sync_threshold
            )));
        }
        Ok(())
    }
}

// ─── Persisted race config ──────────────────────────────────────────

/// The one persisted setting: race length in laps, 0 = unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RaceConfig {
    target_laps: u8,
}

impl RaceConfig {
    /// Build from a validated value. Values above the maximum are clamped.
    pub const fn new(target_laps: u8) -> Self {
        let target_laps = if target_laps > TARGET_LAPS_MAX {
            TARGET_LAPS_MAX
        } else {
            target_laps
        };
        Self { target_laps }
    }

    /// Build from the raw store byte. Out-of-range bytes are clamped, not trusted.
    pub fn from_stored(raw: u8) -> Self {
        if raw > TARGET_LAPS_MAX {
            warn!(
                "Stored target lap count {raw} out of range [0, {TARGET_LAPS_MAX}], clamping"
            );
        }
        Self::new(raw)
    }

    #[inline]
    pub const fn target_laps(&self) -> u8 {
        self.target_laps
    }

    /// `true` when the race has no automatic finish.
    #[inline]
    pub const fn is_unlimited(&self) -> bool {
        self.target_laps == 0
    }
}

/// Setup increment: 0, 1, …, 20, 0, …
#[inline]
pub const fn next_target_laps(current: u8) -> u8 {
    if current >= TARGET_LAPS_MAX {
        0
    } else {
        current + 1
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
