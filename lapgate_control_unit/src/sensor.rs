//! Sensor gate monitor: per-cycle sampling, threshold classification and
//! gate-health tracking.
//!
//! Two thresholds with hysteresis between them:
//! - `lap_threshold`: below → `Blocked`, used for lap and false-start logic.
//! - `sync_threshold`: stricter baseline used only while syncing, so a
//!   noisy near-threshold beam is never mistaken for a calibrated one.
//!
//! Health: a lane that has not produced a single `Clear` reading for
//! `gate_lost_timeout` is reported lost. The check is mode-independent.

use lapgate_common::consts::{LANE_COUNT, SENSOR_RAW_MAX};
use lapgate_common::hal::{GateSensors, Millis};
use lapgate_common::race::config::SensorConfig;
use lapgate_common::race::state::{GateState, LaneIndex};

/// Both lanes sampled at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSample {
    /// Raw readings, clamped to the sensor range.
    pub raw: [u16; LANE_COUNT],
    /// Lap-threshold classification.
    pub gate: [GateState; LANE_COUNT],
    /// Reading at or above the sync threshold.
    pub sync_clear: [bool; LANE_COUNT],
}

impl GateSample {
    #[inline]
    pub const fn gate(&self, lane: LaneIndex) -> GateState {
        self.gate[lane.index()]
    }

    /// Classify a pair of raw readings against both thresholds. Readings
    /// above the sensor range are `Blocked` and never sync-clear.
    pub fn from_raw(raw: [u16; LANE_COUNT], config: &SensorConfig) -> Self {
        Self {
            raw: raw.map(|r| r.min(SENSOR_RAW_MAX)),
            gate: raw.map(|r| classify(r, config.lap_threshold)),
            sync_clear: raw.map(|r| r <= SENSOR_RAW_MAX && r >= config.sync_threshold),
        }
    }
}

#[inline]
fn classify(raw: u16, threshold: u16) -> GateState {
    if raw < threshold || raw > SENSOR_RAW_MAX {
        GateState::Blocked
    } else {
        GateState::Clear
    }
}

/// Samples the gates and watches their health.
#[derive(Debug, Clone)]
pub struct SensorGateMonitor {
    config: SensorConfig,
    gate_lost_timeout: Millis,
    last_clear: [Millis; LANE_COUNT],
}

impl SensorGateMonitor {
    /// `now` seeds the health timers so boot does not count as a lost gate.
    pub fn new(config: SensorConfig, gate_lost_timeout: Millis, now: Millis) -> Self {
        Self {
            config,
            gate_lost_timeout,
            last_clear: [now; LANE_COUNT],
        }
    }

    /// Read both lanes, then classify. No lane is judged before both are read.
    pub fn read(&mut self, sensors: &mut dyn GateSensors, now: Millis) -> GateSample {
        let raw = LaneIndex::ALL.map(|lane| sensors.read(lane));
        self.sample(raw, now)
    }

    /// Classify a pair of raw readings and update the health timers.
    pub fn sample(&mut self, raw: [u16; LANE_COUNT], now: Millis) -> GateSample {
        let sample = GateSample::from_raw(raw, &self.config);
        for lane in LaneIndex::ALL {
            if sample.gate(lane).is_clear() {
                self.last_clear[lane.index()] = now;
            }
        }
        sample
    }

    /// First lane (in lane order) whose last `Clear` is older than the timeout.
    pub fn gate_lost(&self, now: Millis) -> Option<LaneIndex> {
        LaneIndex::ALL
            .into_iter()
            .find(|lane| now.saturating_sub(self.last_clear[lane.index()]) > self.gate_lost_timeout)
    }

    #[inline]
    pub const fn last_clear(&self, lane: LaneIndex) -> Millis {
        self.last_clear[lane.index()]
    }

    #[inline]
    pub const fn config(&self) -> &SensorConfig {
        &self.config
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
