//! Cooperative control cycle: sample → decide → signal → display.
//!
//! ## Cycle Body
//! 1. Sample both gates, then check gate health.
//! 2. Poll the button once.
//! 3. Tick the race state machine (at most one transition).
//! 4. Log transitions and laps, persist a confirmed target.
//! 5. Wake pulse when leaving Sleep.
//! 6. Tone, indicator and lamp diffs.
//! 7. Display schedule.
//!
//! ## Cycle Loop
//! Paced with `std::thread::sleep` for the remainder of the cycle period.
//! Overruns are counted, not fatal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use lapgate_common::hal::{
    ButtonInput, Clock, ConfigStore, GateSensors, IndicatorBus, Millis, StatusLamp, ToneSource,
};
use lapgate_common::race::config::RaceConfig;
use lapgate_common::race::state::ModeKind;

use crate::config::LapGateConfig;
use crate::display::{DisplayRefreshScheduler, LaneDisplays};
use crate::sensor::SensorGateMonitor;
use crate::signals::{self, SignalOutputs};
use crate::state::machine::{RaceStateMachine, TickOutcome, Transition, TransitionCause};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [µs].
    pub last_cycle_us: u64,
    /// Minimum cycle duration [µs].
    pub min_cycle_us: u64,
    /// Maximum cycle duration [µs].
    pub max_cycle_us: u64,
    /// Running sum for average computation.
    pub sum_cycle_us: u64,
    /// Cycles that took longer than the period.
    pub overruns: u64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_us: 0,
            min_cycle_us: u64::MAX,
            max_cycle_us: 0,
            sum_cycle_us: 0,
            overruns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_us: u64) {
        self.cycle_count += 1;
        self.last_cycle_us = duration_us;
        self.min_cycle_us = self.min_cycle_us.min(duration_us);
        self.max_cycle_us = self.max_cycle_us.max(duration_us);
        self.sum_cycle_us = self.sum_cycle_us.saturating_add(duration_us);
    }

    /// Average cycle time [µs] (returns 0 if no cycles).
    #[inline]
    pub fn avg_cycle_us(&self) -> u64 {
        self.sum_cycle_us.checked_div(self.cycle_count).unwrap_or(0)
    }
}

// ─── Peripherals ────────────────────────────────────────────────────

/// Every hardware seam the cycle drives.
pub struct Peripherals {
    pub sensors: Box<dyn GateSensors>,
    pub button: Box<dyn ButtonInput>,
    pub displays: LaneDisplays,
    pub tone: Box<dyn ToneSource>,
    pub indicator: Box<dyn IndicatorBus>,
    pub lamp: Box<dyn StatusLamp>,
    pub store: Box<dyn ConfigStore>,
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Owns the race engine and its peripherals.
pub struct CycleRunner {
    machine: RaceStateMachine,
    monitor: SensorGateMonitor,
    signals: SignalOutputs,
    display: DisplayRefreshScheduler,
    io: Peripherals,
    stats: CycleStats,
    cycle_time: Duration,
}

impl CycleRunner {
    /// Boot at `now`: read the persisted target and enter Sync.
    pub fn new(config: &LapGateConfig, mut io: Peripherals, now: Millis) -> Self {
        let race = load_target(io.store.as_mut());
        info!(
            "Target lap count: {}",
            if race.is_unlimited() {
                "unlimited".to_string()
            } else {
                race.target_laps().to_string()
            }
        );

        Self {
            machine: RaceStateMachine::new(config.timing, race, now),
            monitor: SensorGateMonitor::new(config.sensor, config.timing.gate_lost_timeout_ms, now),
            signals: SignalOutputs::new(),
            display: DisplayRefreshScheduler::new(),
            io,
            stats: CycleStats::new(),
            cycle_time: Duration::from_millis(config.control.cycle_time_ms),
        }
    }

    #[inline]
    pub fn machine(&self) -> &RaceStateMachine {
        &self.machine
    }

    #[inline]
    pub fn monitor(&self) -> &SensorGateMonitor {
        &self.monitor
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Execute one control cycle at `now`.
    pub fn step(&mut self, now: Millis) -> TickOutcome {
        let sample = self.monitor.read(self.io.sensors.as_mut(), now);
        let gate_lost = self.monitor.gate_lost(now);
        let event = self.io.button.poll();

        let out = self.machine.tick(now, &sample, gate_lost, event);

        if let Some(transition) = out.transition {
            log_transition(&transition);
            self.display.force_refresh();
            if transition.from == ModeKind::Sleep {
                self.signals.wake_pulse(self.io.indicator.as_mut());
            }
        }

        for lap in out.laps.iter().flatten() {
            info!(
                "{} lap {}: {}.{:03} s{}",
                lap.lane,
                lap.lap,
                lap.duration / 1000,
                lap.duration % 1000,
                if lap.best { " (best)" } else { "" }
            );
        }

        if let Some(target) = out.persist {
            if let Err(e) = self.io.store.set(target) {
                warn!("Failed to persist target lap count {target}: {e}");
            }
        }

        let mode = *self.machine.mode();
        self.signals.apply(
            signals::plan(&mode, now),
            self.io.tone.as_mut(),
            self.io.indicator.as_mut(),
            self.io.lamp.as_mut(),
        );

        self.display.update(
            now,
            &mode,
            self.machine.lanes_mut(),
            &sample,
            &mut self.io.displays,
        );

        out
    }

    /// Run cycles until `running` is cleared or `max_cycles` is reached.
    pub fn run(&mut self, clock: &dyn Clock, running: &AtomicBool, max_cycles: Option<u64>) {
        let period_us = self.cycle_time.as_micros() as u64;

        while running.load(Ordering::SeqCst) {
            if max_cycles.is_some_and(|max| self.stats.cycle_count >= max) {
                info!("Reached {} cycles, stopping", self.stats.cycle_count);
                break;
            }

            let cycle_start = Instant::now();
            self.step(clock.now_ms());
            let elapsed = cycle_start.elapsed();

            let duration_us = elapsed.as_micros() as u64;
            self.stats.record(duration_us);
            if duration_us > period_us {
                self.stats.overruns += 1;
            }

            if let Some(remaining) = self.cycle_time.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }

        info!(
            "Cycle stats: {} cycles, min {} µs, avg {} µs, max {} µs, {} overruns",
            self.stats.cycle_count,
            if self.stats.cycle_count == 0 { 0 } else { self.stats.min_cycle_us },
            self.stats.avg_cycle_us(),
            self.stats.max_cycle_us,
            self.stats.overruns,
        );
    }
}

/// Persisted target, clamped. A failed read falls back to unlimited.
fn load_target(store: &mut dyn ConfigStore) -> RaceConfig {
    match store.get() {
        Ok(raw) => RaceConfig::from_stored(raw),
        Err(e) => {
            warn!("Failed to read target lap count: {e}, racing without a limit");
            RaceConfig::default()
        }
    }
}

fn log_transition(t: &Transition) {
    match t.cause {
        TransitionCause::GateLost(lane) => {
            warn!("{lane} gate lost, {} → {}", t.from, t.to);
        }
        TransitionCause::Winner(lane) => {
            info!("{lane} wins, {} → {}", t.from, t.to);
        }
        TransitionCause::FalseStart => {
            warn!("False start, {} → {}", t.from, t.to);
        }
        cause => {
            info!("{} → {} ({cause:?})", t.from, t.to);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
