//! Lane timing engine: debounced lap detection, best lap, live position,
//! win check and false-start detection.
//!
//! A lap registers on the trailing edge of an obstruction (`Blocked → Clear`)
//! and only once `min_lap` has elapsed since the lap started. Both lanes are
//! evaluated in lane order against the same sample.

use bitflags::bitflags;

use lapgate_common::consts::LANE_COUNT;
use lapgate_common::hal::Millis;
use lapgate_common::race::state::{GateState, LaneIndex, Position};

use crate::sensor::GateSample;

bitflags! {
    /// Fields of a lane display that changed since the last redraw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LaneDirty: u8 {
        const LAP      = 0x01;
        const BEST_LAP = 0x02;
        const POSITION = 0x04;
    }
}

impl Default for LaneDirty {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-lane race state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    /// Laps completed since Run entry.
    pub lap_count: u32,
    /// Start of the current lap.
    pub lap_start: Millis,
    /// Most recent completed lap, 0 before the first one.
    pub last_lap: Millis,
    /// Fastest completed lap this race.
    pub best_lap: Option<Millis>,
    /// Previous cycle's classification, for edge detection.
    pub last_gate: GateState,
    pub position: Position,
    pub dirty: LaneDirty,
}

impl Lane {
    pub const fn new(lane: LaneIndex) -> Self {
        Self {
            lap_count: 0,
            lap_start: 0,
            last_lap: 0,
            best_lap: None,
            last_gate: GateState::Clear,
            position: Position::initial(lane),
            dirty: LaneDirty::empty(),
        }
    }

    /// Running time of the current lap.
    #[inline]
    pub const fn current_lap(&self, now: Millis) -> Millis {
        now.saturating_sub(self.lap_start)
    }
}

/// A lap registered this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapEvent {
    pub lane: LaneIndex,
    /// Lap number just completed (1-based).
    pub lap: u32,
    pub duration: Millis,
    /// The lap set a new best.
    pub best: bool,
}

/// What one Run cycle produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutcome {
    pub laps: [Option<LapEvent>; LANE_COUNT],
    /// Ranking flipped this cycle.
    pub position_flip: bool,
    /// First lane (in lane order) at or past the target.
    pub winner: Option<LaneIndex>,
}

/// Owns both lanes for the duration of the controller.
#[derive(Debug, Clone)]
pub struct LaneTimingEngine {
    lanes: [Lane; LANE_COUNT],
    min_lap: Millis,
}

impl LaneTimingEngine {
    pub fn new(min_lap: Millis) -> Self {
        Self {
            lanes: LaneIndex::ALL.map(Lane::new),
            min_lap,
        }
    }

    #[inline]
    pub const fn lanes(&self) -> &[Lane; LANE_COUNT] {
        &self.lanes
    }

    #[inline]
    pub fn lanes_mut(&mut self) -> &mut [Lane; LANE_COUNT] {
        &mut self.lanes
    }

    #[inline]
    pub const fn lane(&self, lane: LaneIndex) -> &Lane {
        &self.lanes[lane.index()]
    }

    /// Reset race fields on Run entry. Every lap starts at the countdown anchor.
    pub fn reset_for_run(&mut self, t0: Millis) {
        for lane in LaneIndex::ALL {
            self.lanes[lane.index()] = Lane {
                lap_start: t0,
                dirty: LaneDirty::all(),
                ..Lane::new(lane)
            };
        }
    }

    /// One Run cycle: lap registration, position update, win check.
    ///
    /// Each stage sees both lanes' results from the stage before, so two
    /// laps on the same cycle are ranked against the final counts.
    pub fn evaluate_run(&mut self, sample: &GateSample, now: Millis, target_laps: u8) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        for lane in LaneIndex::ALL {
            let l = &mut self.lanes[lane.index()];
            let reading = sample.gate(lane);
            let edge = l.last_gate.is_blocked() && reading.is_clear();
            l.last_gate = reading;
            if edge && l.current_lap(now) >= self.min_lap {
                outcome.laps[lane.index()] = Some(register_lap(l, lane, now));
            }
        }

        for lane in LaneIndex::ALL {
            if outcome.laps[lane.index()].is_some() {
                outcome.position_flip |= self.update_position(lane);
            }
        }

        if target_laps > 0 {
            outcome.winner = LaneIndex::ALL
                .into_iter()
                .find(|lane| self.lanes[lane.index()].lap_count >= u32::from(target_laps));
        }

        outcome
    }

    /// Lanes reading `Blocked` while the countdown is still running.
    pub fn detect_false_starts(sample: &GateSample, now: Millis, t0: Millis) -> [bool; LANE_COUNT] {
        if now >= t0 {
            return [false; LANE_COUNT];
        }
        sample.gate.map(GateState::is_blocked)
    }

    /// Take and clear the dirty flags of a lane.
    pub fn take_dirty(&mut self, lane: LaneIndex) -> LaneDirty {
        core::mem::take(&mut self.lanes[lane.index()].dirty)
    }

    /// Swap ranks when `lane` strictly leads; both lanes marked together.
    fn update_position(&mut self, lane: LaneIndex) -> bool {
        let (me, other) = (lane.index(), lane.other().index());
        if self.lanes[me].lap_count > self.lanes[other].lap_count
            && self.lanes[me].position != Position::First
        {
            self.lanes[me].position = Position::First;
            self.lanes[other].position = Position::Second;
            self.lanes[me].dirty |= LaneDirty::POSITION;
            self.lanes[other].dirty |= LaneDirty::POSITION;
            return true;
        }
        false
    }
}

fn register_lap(l: &mut Lane, lane: LaneIndex, now: Millis) -> LapEvent {
    let duration = l.current_lap(now);
    l.lap_count += 1;
    l.last_lap = duration;
    l.dirty |= LaneDirty::LAP;

    let best = l.best_lap.is_none_or(|best| duration < best);
    if best {
        l.best_lap = Some(duration);
        l.dirty |= LaneDirty::BEST_LAP;
    }
    l.lap_start = now;

    LapEvent {
        lane,
        lap: l.lap_count,
        duration,
        best,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
