//! Two cars circling a track with one infrared gate per lane.
//!
//! Each car blocks its beam for `pass_ms` once per `lap_ms`, starting at
//! `cars_start_ms + offset_ms`. Readings carry deterministic noise so runs
//! are reproducible.

use lapgate_common::consts::{LANE_COUNT, SENSOR_RAW_MAX};
use lapgate_common::hal::{Clock, GateSensors, Millis};
use lapgate_common::race::state::LaneIndex;

use super::config::{CarConfig, SimulationConfig};

/// Gate sensors backed by a simulated track.
#[derive(Debug, Clone)]
pub struct SimulatedTrack<C> {
    clock: C,
    cars_start_ms: Millis,
    cars: [CarConfig; LANE_COUNT],
    baseline: u16,
    blocked: u16,
    noise: u16,
}

impl<C: Clock> SimulatedTrack<C> {
    pub fn new(config: &SimulationConfig, clock: C) -> Self {
        Self {
            clock,
            cars_start_ms: config.cars_start_ms,
            cars: config.cars,
            baseline: config.baseline,
            blocked: config.blocked,
            noise: config.noise,
        }
    }

    /// Car of `lane` is inside the beam at `now`.
    pub fn blocked_at(&self, lane: LaneIndex, now: Millis) -> bool {
        let car = &self.cars[lane.index()];
        let first_pass = self.cars_start_ms + car.offset_ms;
        if now < first_pass || car.lap_ms == 0 {
            return false;
        }
        (now - first_pass) % car.lap_ms < car.pass_ms
    }

    /// Raw reading of `lane` at `now`.
    pub fn reading_at(&self, lane: LaneIndex, now: Millis) -> u16 {
        let level = if self.blocked_at(lane, now) {
            self.blocked
        } else {
            self.baseline
        };
        let noisy = i32::from(level) + noise_at(now, lane, self.noise);
        noisy.clamp(0, i32::from(SENSOR_RAW_MAX)) as u16
    }
}

impl<C: Clock> GateSensors for SimulatedTrack<C> {
    fn read(&mut self, lane: LaneIndex) -> u16 {
        self.reading_at(lane, self.clock.now_ms())
    }
}

/// Deterministic noise in `-amplitude..=amplitude`.
fn noise_at(now: Millis, lane: LaneIndex, amplitude: u16) -> i32 {
    if amplitude == 0 {
        return 0;
    }
    let mixed = now
        .wrapping_mul(2_654_435_761)
        .wrapping_add(lane.index() as u64 * 40_503)
        >> 7;
    let span = 2 * u64::from(amplitude) + 1;
    (mixed % span) as i32 - i32::from(amplitude)
}
