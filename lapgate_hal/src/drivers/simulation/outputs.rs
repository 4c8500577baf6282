//! Buzzer, indicator bar and lamp that only log what they are told.

use tracing::debug;

use lapgate_common::hal::{IndicatorBus, StatusLamp, ToneSource};

#[derive(Debug, Clone, Default)]
pub struct LoggingTone {
    playing: Option<u16>,
}

impl LoggingTone {
    pub fn playing(&self) -> Option<u16> {
        self.playing
    }
}

impl ToneSource for LoggingTone {
    fn start_tone(&mut self, hz: u16) {
        debug!(hz, "tone on");
        self.playing = Some(hz);
    }

    fn stop_tone(&mut self) {
        debug!("tone off");
        self.playing = None;
    }
}

/// Eight-segment bar, rendered `#` lit, `.` dark, MSB first.
#[derive(Debug, Clone, Default)]
pub struct LoggingIndicator {
    pattern: u8,
}

impl LoggingIndicator {
    pub fn pattern(&self) -> u8 {
        self.pattern
    }
}

impl IndicatorBus for LoggingIndicator {
    fn write_pattern(&mut self, pattern: u8) {
        if pattern != self.pattern {
            let bar: String = (0..8)
                .rev()
                .map(|bit| if pattern & (1 << bit) != 0 { '#' } else { '.' })
                .collect();
            debug!("indicator [{bar}]");
        }
        self.pattern = pattern;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoggingLamp {
    on: bool,
}

impl LoggingLamp {
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl StatusLamp for LoggingLamp {
    fn set(&mut self, on: bool) {
        debug!(on, "start lamp");
        self.on = on;
    }
}
