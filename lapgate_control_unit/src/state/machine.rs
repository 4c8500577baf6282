//! Race mode controller.
//!
//! Sync → Wait → Warmup → Run → Result, with FalseStart, Setup and Sleep
//! side branches. Mode-specific data lives in the active [`RaceMode`]
//! variant, so nothing leaks from one mode into the next.
//!
//! Per-cycle evaluation order, at most one transition per cycle:
//! 1. gate-lost → Sync (from any mode but Sync)
//! 2. button event
//! 3. inactivity → Sleep (from any mode but Sync and Sleep)
//! 4. mode timers and lap logic

use tracing::{debug, trace};

use lapgate_common::consts::LANE_COUNT;
use lapgate_common::hal::Millis;
use lapgate_common::race::config::{RaceConfig, TimingConfig, next_target_laps};
use lapgate_common::race::state::{ButtonEvent, LaneIndex, ModeKind};

use crate::lane::{LaneTimingEngine, LapEvent};
use crate::sensor::GateSample;

/// Active race mode with its per-mode data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceMode {
    /// `unstable_at[i]`: last instant lane `i` read below the sync threshold.
    Sync { unstable_at: [Millis; LANE_COUNT] },
    Wait,
    /// Countdown towards `t0`.
    Warmup {
        t0: Millis,
        false_started: [bool; LANE_COUNT],
    },
    /// Live timing, started at `t0`.
    Run { t0: Millis },
    FalseStart {
        entered_at: Millis,
        offenders: [bool; LANE_COUNT],
    },
    /// `target` is the pending, uncommitted lap count.
    Setup { target: u8 },
    Sleep,
    Result {
        winner: LaneIndex,
        finished_at: Millis,
    },
}

impl RaceMode {
    #[inline]
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::Sync { .. } => ModeKind::Sync,
            Self::Wait => ModeKind::Wait,
            Self::Warmup { .. } => ModeKind::Warmup,
            Self::Run { .. } => ModeKind::Run,
            Self::FalseStart { .. } => ModeKind::FalseStart,
            Self::Setup { .. } => ModeKind::Setup,
            Self::Sleep => ModeKind::Sleep,
            Self::Result { .. } => ModeKind::Result,
        }
    }

    const fn sync(now: Millis) -> Self {
        Self::Sync {
            unstable_at: [now; LANE_COUNT],
        }
    }

    const fn warmup(now: Millis, warmup_ms: Millis) -> Self {
        Self::Warmup {
            t0: now + warmup_ms,
            false_started: [false; LANE_COUNT],
        }
    }
}

/// Why a transition was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Both gates held a stable baseline.
    Synced,
    /// A gate produced no Clear reading for too long.
    GateLost(LaneIndex),
    /// No button and no lap for the sleep timeout.
    Inactivity,
    Click,
    LongPress,
    /// Countdown reached `t0`.
    CountdownExpired,
    FalseStart,
    Winner(LaneIndex),
    /// FalseStart display time is over.
    HoldElapsed,
}

/// A mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ModeKind,
    pub to: ModeKind,
    pub cause: TransitionCause,
}

/// Everything one cycle produced that the outside world acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub transition: Option<Transition>,
    pub laps: [Option<LapEvent>; LANE_COUNT],
    /// Target lap count confirmed in Setup; to be persisted.
    pub persist: Option<u8>,
}

/// Race state machine. Owns the lanes and all race timers.
#[derive(Debug, Clone)]
pub struct RaceStateMachine {
    mode: RaceMode,
    timing: TimingConfig,
    race: RaceConfig,
    lanes: LaneTimingEngine,
    last_interaction: Millis,
    last_lap_activity: [Millis; LANE_COUNT],
}

impl RaceStateMachine {
    /// Boot into Sync at `now`.
    pub fn new(timing: TimingConfig, race: RaceConfig, now: Millis) -> Self {
        Self {
            mode: RaceMode::sync(now),
            timing,
            race,
            lanes: LaneTimingEngine::new(timing.min_lap_ms),
            last_interaction: now,
            last_lap_activity: [now; LANE_COUNT],
        }
    }

    #[inline]
    pub const fn mode(&self) -> &RaceMode {
        &self.mode
    }

    #[inline]
    pub const fn kind(&self) -> ModeKind {
        self.mode.kind()
    }

    #[inline]
    pub const fn race_config(&self) -> RaceConfig {
        self.race
    }

    #[inline]
    pub const fn lanes(&self) -> &LaneTimingEngine {
        &self.lanes
    }

    #[inline]
    pub fn lanes_mut(&mut self) -> &mut LaneTimingEngine {
        &mut self.lanes
    }

    #[inline]
    pub const fn last_interaction(&self) -> Millis {
        self.last_interaction
    }

    /// Run one control cycle.
    pub fn tick(
        &mut self,
        now: Millis,
        sample: &GateSample,
        gate_lost: Option<LaneIndex>,
        event: Option<ButtonEvent>,
    ) -> TickOutcome {
        let mut out = TickOutcome::default();

        if event.is_some() {
            self.last_interaction = now;
        }

        if let Some(lane) = gate_lost {
            if !matches!(self.mode, RaceMode::Sync { .. }) {
                out.transition = Some(self.enter(
                    RaceMode::sync(now),
                    TransitionCause::GateLost(lane),
                ));
                return out;
            }
        }

        if let Some(event) = event {
            if let Some((next, cause)) = self.handle_button(event, &mut out) {
                let next = match next {
                    Pending::Warmup => RaceMode::warmup(now, self.timing.warmup_ms),
                    Pending::Mode(mode) => mode,
                };
                out.transition = Some(self.enter(next, cause));
                return out;
            }
        }

        if self.sleep_due(now) {
            out.transition = Some(self.enter(RaceMode::Sleep, TransitionCause::Inactivity));
            return out;
        }

        if let Some((next, cause)) = self.evaluate_mode(now, sample, &mut out) {
            // A fresh Wait gets the full sleep timeout, however long Sync took.
            if matches!(cause, TransitionCause::Synced) {
                self.last_interaction = now;
            }
            out.transition = Some(self.enter(next, cause));
        }
        out
    }

    fn handle_button(
        &mut self,
        event: ButtonEvent,
        out: &mut TickOutcome,
    ) -> Option<(Pending, TransitionCause)> {
        use ButtonEvent::{Click, LongPressStart};
        use TransitionCause as C;

        match (&mut self.mode, event) {
            (RaceMode::Sync { .. }, _) => {
                trace!(?event, "button ignored while syncing");
                None
            }
            (
                RaceMode::Wait | RaceMode::Warmup { .. } | RaceMode::Run { .. } | RaceMode::Result { .. },
                Click,
            ) => Some((Pending::Warmup, C::Click)),
            (RaceMode::FalseStart { .. }, Click) => Some((Pending::Mode(RaceMode::Wait), C::Click)),
            (
                RaceMode::Wait
                | RaceMode::Warmup { .. }
                | RaceMode::Run { .. }
                | RaceMode::FalseStart { .. }
                | RaceMode::Result { .. },
                LongPressStart,
            ) => Some((
                Pending::Mode(RaceMode::Setup {
                    target: self.race.target_laps(),
                }),
                C::LongPress,
            )),
            (RaceMode::Setup { target }, Click) => {
                *target = next_target_laps(*target);
                debug!(target = *target, "setup: target laps changed");
                None
            }
            (RaceMode::Setup { target }, LongPressStart) => {
                self.race = RaceConfig::new(*target);
                out.persist = Some(self.race.target_laps());
                Some((Pending::Mode(RaceMode::Wait), C::LongPress))
            }
            (RaceMode::Sleep, Click) => Some((Pending::Mode(RaceMode::Wait), C::Click)),
            (RaceMode::Sleep, LongPressStart) => Some((Pending::Mode(RaceMode::Wait), C::LongPress)),
        }
    }

    fn sleep_due(&self, now: Millis) -> bool {
        if matches!(self.mode, RaceMode::Sync { .. } | RaceMode::Sleep) {
            return false;
        }
        let timeout = self.timing.sleep_timeout_ms;
        now.saturating_sub(self.last_interaction) >= timeout
            && self
                .last_lap_activity
                .iter()
                .all(|&at| now.saturating_sub(at) >= timeout)
    }

    fn evaluate_mode(
        &mut self,
        now: Millis,
        sample: &GateSample,
        out: &mut TickOutcome,
    ) -> Option<(RaceMode, TransitionCause)> {
        match &mut self.mode {
            RaceMode::Sync { unstable_at } => {
                for lane in LaneIndex::ALL {
                    if !sample.sync_clear[lane.index()] {
                        unstable_at[lane.index()] = now;
                    }
                }
                let window = self.timing.sync_stable_ms;
                unstable_at
                    .iter()
                    .all(|&at| now.saturating_sub(at) >= window)
                    .then_some((RaceMode::Wait, TransitionCause::Synced))
            }
            RaceMode::Warmup { t0, false_started } => {
                let flags = LaneTimingEngine::detect_false_starts(sample, now, *t0);
                for (flag, hit) in false_started.iter_mut().zip(flags) {
                    *flag |= hit;
                }
                if false_started.iter().any(|&f| f) {
                    Some((
                        RaceMode::FalseStart {
                            entered_at: now,
                            offenders: *false_started,
                        },
                        TransitionCause::FalseStart,
                    ))
                } else if now >= *t0 {
                    Some((RaceMode::Run { t0: *t0 }, TransitionCause::CountdownExpired))
                } else {
                    None
                }
            }
            RaceMode::Run { .. } => {
                let run = self
                    .lanes
                    .evaluate_run(sample, now, self.race.target_laps());
                out.laps = run.laps;
                for lap in run.laps.iter().flatten() {
                    self.last_lap_activity[lap.lane.index()] = now;
                }
                run.winner.map(|winner| {
                    (
                        RaceMode::Result {
                            winner,
                            finished_at: now,
                        },
                        TransitionCause::Winner(winner),
                    )
                })
            }
            RaceMode::FalseStart { entered_at, .. } => {
                let held = now.saturating_sub(*entered_at);
                (held >= self.timing.false_start_hold_ms)
                    .then_some((RaceMode::Wait, TransitionCause::HoldElapsed))
            }
            RaceMode::Wait | RaceMode::Setup { .. } | RaceMode::Sleep | RaceMode::Result { .. } => {
                None
            }
        }
    }

    fn enter(&mut self, next: RaceMode, cause: TransitionCause) -> Transition {
        let from = self.mode.kind();
        if let RaceMode::Run { t0 } = next {
            self.lanes.reset_for_run(t0);
        }
        self.mode = next;
        Transition {
            from,
            to: next.kind(),
            cause,
        }
    }
}

/// Button outcome whose concrete mode needs `now`.
enum Pending {
    Warmup,
    Mode(RaceMode),
}

// ─── Tests ──────────────────────────────────────────────────────────
