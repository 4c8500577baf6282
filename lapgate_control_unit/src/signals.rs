//! Buzzer, indicator bar and start-button lamp.
//!
//! [`plan`] is a pure function of the active mode and the clock. [`SignalOutputs`]
//! diffs each plan against what was last written so the tone and lamp only
//! see changes. The indicator is rewritten every Warmup cycle and only on
//! change elsewhere.

use std::time::Duration;

use tracing::debug;

use lapgate_common::consts::{
    CADENCE_TONE_HZ, FALSE_START_TONE_HZ, FALSE_START_TONE_MS, START_TONE_HZ, START_TONE_MS,
    WAKE_PULSE_MS, WARMUP_CADENCE_MS,
};
use lapgate_common::hal::{IndicatorBus, Millis, StatusLamp, ToneSource};

use crate::state::machine::RaceMode;

/// Desired output state for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalPlan {
    /// Tone frequency in Hz, `None` for silence.
    pub tone: Option<u16>,
    /// Indicator bar pattern.
    pub pattern: u8,
    /// Write the pattern even when unchanged.
    pub refresh_pattern: bool,
    pub lamp: bool,
}

/// Countdown bar: one more segment lit every second, `0b0010_0000` in the
/// final second up to `0b0011_1110` at the start.
#[inline]
pub const fn warmup_pattern(phase: u64) -> u8 {
    let half = if phase / 2 > 5 { 5 } else { phase / 2 };
    64 - (1u8 << (5 - half) as u32)
}

/// Outputs for `mode` at `now`.
pub fn plan(mode: &RaceMode, now: Millis) -> SignalPlan {
    match *mode {
        RaceMode::Warmup { t0, .. } => {
            let phase = t0.saturating_sub(now) / WARMUP_CADENCE_MS;
            SignalPlan {
                tone: (phase % 2 == 1).then_some(CADENCE_TONE_HZ),
                pattern: warmup_pattern(phase),
                refresh_pattern: true,
                lamp: false,
            }
        }
        RaceMode::Run { t0 } => SignalPlan {
            tone: (now.saturating_sub(t0) < START_TONE_MS).then_some(START_TONE_HZ),
            ..SignalPlan::default()
        },
        RaceMode::FalseStart { entered_at, .. } => SignalPlan {
            tone: (now.saturating_sub(entered_at) < FALSE_START_TONE_MS)
                .then_some(FALSE_START_TONE_HZ),
            ..SignalPlan::default()
        },
        RaceMode::Wait | RaceMode::Setup { .. } | RaceMode::Result { .. } => SignalPlan {
            lamp: true,
            ..SignalPlan::default()
        },
        RaceMode::Sync { .. } | RaceMode::Sleep => SignalPlan::default(),
    }
}

/// Last written output state. `None` until the first write.
#[derive(Debug, Clone, Default)]
pub struct SignalOutputs {
    tone: Option<Option<u16>>,
    pattern: Option<u8>,
    lamp: Option<bool>,
}

impl SignalOutputs {
    pub const fn new() -> Self {
        Self {
            tone: None,
            pattern: None,
            lamp: None,
        }
    }

    /// Write whatever differs from the previous cycle.
    pub fn apply(
        &mut self,
        plan: SignalPlan,
        tone: &mut dyn ToneSource,
        bus: &mut dyn IndicatorBus,
        lamp: &mut dyn StatusLamp,
    ) {
        if self.tone != Some(plan.tone) {
            match plan.tone {
                Some(hz) => tone.start_tone(hz),
                None => tone.stop_tone(),
            }
            debug!(tone = ?plan.tone, "tone changed");
            self.tone = Some(plan.tone);
        }

        if plan.refresh_pattern || self.pattern != Some(plan.pattern) {
            bus.write_pattern(plan.pattern);
            self.pattern = Some(plan.pattern);
        }

        if self.lamp != Some(plan.lamp) {
            lamp.set(plan.lamp);
            debug!(on = plan.lamp, "status lamp");
            self.lamp = Some(plan.lamp);
        }
    }

    /// Full-on flash while waking. Blocks for [`WAKE_PULSE_MS`].
    pub fn wake_pulse(&mut self, bus: &mut dyn IndicatorBus) {
        bus.pulse(0xFF, Duration::from_millis(WAKE_PULSE_MS));
        self.pattern = Some(0);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
