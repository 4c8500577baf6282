//! Hardware seams and HAL error types.
//!
//! The race-control engine never touches a pin. Everything it reads or
//! drives goes through one of these narrow traits:
//!
//! | Trait | Direction | Cadence |
//! |-------|-----------|---------|
//! | [`GateSensors`] | in | both lanes, every cycle |
//! | [`ButtonInput`] | in | polled every cycle |
//! | [`Clock`] | in | read once per cycle |
//! | [`TextDisplay`] | out | per refresh schedule |
//! | [`ToneSource`] | out | on change |
//! | [`IndicatorBus`] | out | every Warmup cycle, on change otherwise |
//! | [`StatusLamp`] | out | on change |
//! | [`ConfigStore`] | in/out | once at boot, once per Setup confirm |
//!
//! Output operations are idempotent and infallible from the engine's point
//! of view; only the config store reports failures.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::consts::DISPLAY_COLS;
use crate::race::state::{ButtonEvent, LaneIndex};

/// Monotonic milliseconds since controller start.
pub type Millis = u64;

/// One display row, fixed capacity, no heap.
pub type DisplayLine = heapless::String<DISPLAY_COLS>;

/// Error types for HAL operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// State persistence error
    #[error("State persistence error: {0}")]
    PersistenceError(String),
}

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Raw infrared gate readings, 0..=1023, unitless.
pub trait GateSensors {
    fn read(&mut self, lane: LaneIndex) -> u16;
}

/// Classified operator button events.
pub trait ButtonInput {
    /// Next pending event, if any. Each physical action is delivered once.
    fn poll(&mut self) -> Option<ButtonEvent>;
}

/// 16×2 character display.
pub trait TextDisplay {
    fn clear(&mut self);
    fn set_cursor(&mut self, col: u8, row: u8);
    fn print(&mut self, text: &str);
    fn set_backlight(&mut self, on: bool);
}

/// Buzzer.
pub trait ToneSource {
    fn start_tone(&mut self, hz: u16);
    fn stop_tone(&mut self);
}

/// 8-bit shift-register LED bar.
pub trait IndicatorBus {
    fn write_pattern(&mut self, pattern: u8);

    /// Light `pattern` for `hold`, then clear the bar.
    ///
    /// Busy-waits. The only blocking call in the control cycle; keep `hold`
    /// in the tens of milliseconds.
    fn pulse(&mut self, pattern: u8, hold: Duration) {
        self.write_pattern(pattern);
        let start = Instant::now();
        while start.elapsed() < hold {
            std::hint::spin_loop();
        }
        self.write_pattern(0);
    }
}

/// Lamp inside the start button.
pub trait StatusLamp {
    fn set(&mut self, on: bool);
}

/// Single-byte persistent store for the target lap count.
pub trait ConfigStore {
    fn get(&mut self) -> Result<u8, HalError>;
    fn set(&mut self, value: u8) -> Result<(), HalError>;
}
