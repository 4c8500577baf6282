//! Prelude module for common re-exports.
//!
//! ```rust
//! use lapgate_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::race::config::{RaceConfig, SensorConfig, TimingConfig};

// ─── Race types ─────────────────────────────────────────────────────
pub use crate::race::state::{ButtonEvent, GateState, LaneIndex, ModeKind, Position};

// ─── Hardware seams ─────────────────────────────────────────────────
pub use crate::hal::{
    ButtonInput, Clock, ConfigStore, DisplayLine, GateSensors, HalError, IndicatorBus, Millis,
    StatusLamp, TextDisplay, ToneSource,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_MS, LANE_COUNT};
