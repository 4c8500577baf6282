//! System-wide constants for the LapGate workspace.
//!
//! Single source of truth for timing windows, calibration defaults and
//! display geometry. Imported by all crates.

use static_assertions::const_assert;

/// Number of lanes. The installation is fixed at two.
pub const LANE_COUNT: usize = 2;

// ─── Timing [ms] ────────────────────────────────────────────────────

/// Minimum time since lap start before a new lap may register (debounce window).
pub const MIN_LAP_DURATION_MS: u64 = 2000;

/// A lane without a single Clear reading for this long forces resync.
pub const GATE_LOST_TIMEOUT_MS: u64 = 5000;

/// Both gates must read Clear continuously for this long to leave Sync.
pub const SYNC_STABLE_WINDOW_MS: u64 = 2000;

/// Countdown length; `t0 = entry + WARMUP_DURATION_MS`.
pub const WARMUP_DURATION_MS: u64 = 4999;

/// FalseStart returns to Wait after this long.
pub const FALSE_START_HOLD_MS: u64 = 5000;

/// Idle time (no button, no lap) before the system goes to Sleep.
pub const SLEEP_TIMEOUT_MS: u64 = 15000;

/// Half period of the winner backlight blink (1 Hz).
pub const RESULT_BLINK_HALF_PERIOD_MS: u64 = 500;

/// Countdown cadence step; the beep toggles every step.
pub const WARMUP_CADENCE_MS: u64 = 500;

/// Start tone duration after `t0`.
pub const START_TONE_MS: u64 = 1000;

/// Alert tone duration after a false start.
pub const FALSE_START_TONE_MS: u64 = 1000;

/// Indicator pulse while waking from Sleep (bounded busy-wait).
pub const WAKE_PULSE_MS: u64 = 30;

/// Default control cycle period.
pub const CYCLE_TIME_MS: u64 = 5;
/// Cycle period bounds accepted by config validation.
pub const CYCLE_TIME_MS_MIN: u64 = 1;
pub const CYCLE_TIME_MS_MAX: u64 = 100;

// ─── Tones [Hz] ─────────────────────────────────────────────────────

pub const CADENCE_TONE_HZ: u16 = 100;
pub const START_TONE_HZ: u16 = 2000;
pub const FALSE_START_TONE_HZ: u16 = 400;

// ─── Sensor calibration ─────────────────────────────────────────────

/// Upper bound of a raw gate reading.
pub const SENSOR_RAW_MAX: u16 = 1023;

/// Default lap threshold: below → Blocked.
pub const LAP_THRESHOLD: u16 = 800;

/// Default sync threshold: stricter baseline used while calibrating.
pub const SYNC_THRESHOLD: u16 = 900;

// ─── Race ───────────────────────────────────────────────────────────

/// Highest selectable target lap count; Setup wraps back to 0 (unlimited).
pub const TARGET_LAPS_MAX: u8 = 20;

// ─── Display ────────────────────────────────────────────────────────

pub const DISPLAY_COLS: usize = 16;
pub const DISPLAY_ROWS: u8 = 2;

/// Default path of the single-byte target lap store.
pub const DEFAULT_STORE_PATH: &str = "lapgate.target";

const_assert!(LAP_THRESHOLD < SYNC_THRESHOLD);
const_assert!(SYNC_THRESHOLD <= SENSOR_RAW_MAX);
const_assert!(LANE_COUNT == 2);
const_assert!(RESULT_BLINK_HALF_PERIOD_MS * 2 == 1000);
