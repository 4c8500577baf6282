//! Display refresh scheduler for the two 16×2 lane displays.
//!
//! A redraw happens when either
//! - a mode transition forced it: the mode banner is drawn in full, or
//! - the per-mode interval elapsed: only what can change is redrawn. In Run
//!   that is the dirty lane fields plus the live lap clock.
//!
//! Result has its own 1 Hz blink on the winner's backlight, driven
//! independently of the interval and of dirty flags.
//!
//! Row text is built in [`DisplayLine`] buffers, nothing is allocated.

use core::fmt::Write;

use tracing::trace;

use lapgate_common::consts::{DISPLAY_COLS, LANE_COUNT, RESULT_BLINK_HALF_PERIOD_MS};
use lapgate_common::hal::{DisplayLine, Millis, TextDisplay};
use lapgate_common::race::state::{LaneIndex, ModeKind};

use crate::lane::{Lane, LaneDirty, LaneTimingEngine};
use crate::sensor::GateSample;
use crate::state::machine::RaceMode;

/// Both lane displays, display `i` belongs to lane `i`.
pub type LaneDisplays = [Box<dyn TextDisplay>; LANE_COUNT];

/// Periodic redraw interval for a mode.
pub const fn refresh_interval(kind: ModeKind) -> Millis {
    match kind {
        ModeKind::Sync => 100,
        ModeKind::Wait => 1000,
        ModeKind::Warmup => 200,
        ModeKind::Run => 100,
        ModeKind::FalseStart => 500,
        ModeKind::Setup => 200,
        ModeKind::Sleep => 60_000,
        ModeKind::Result => 1000,
    }
}

// ─── Field Layout ───────────────────────────────────────────────────

const LAP_COUNT_AT: (u8, u8) = (4, 0);
const BEST_AT: (u8, u8) = (12, 0);
const CLOCK_AT: (u8, u8) = (5, 1);
const POSITION_AT: (u8, u8) = (15, 1);
const SIGNAL_AT: (u8, u8) = (5, 1);

const LAP_COUNT_WIDTH: usize = 3;
const BEST_WIDTH: usize = 4;
const CLOCK_WIDTH: usize = 6;

// ─── Formatting ─────────────────────────────────────────────────────

/// `text` cut or space-padded to exactly `width` columns.
pub fn fit(text: &str, width: usize) -> DisplayLine {
    let width = width.min(DISPLAY_COLS);
    let mut line = DisplayLine::new();
    for c in text.chars().take(width) {
        let _ = line.push(c);
    }
    while line.len() < width {
        let _ = line.push(' ');
    }
    line
}

/// Seconds with one decimal, `--.-` when unset.
pub fn format_tenths(ms: Option<Millis>) -> DisplayLine {
    let mut line = DisplayLine::new();
    let _ = match ms {
        Some(ms) => write!(line, "{}.{}", ms / 1000, (ms % 1000) / 100),
        None => line.push_str("--.-").map_err(|_| core::fmt::Error),
    };
    line
}

/// [`format_tenths`] fitted to `width`, falling back to whole seconds when
/// the tenth would not fit (a 100 s best shows `100`, not `100.`).
pub fn format_time(ms: Option<Millis>, width: usize) -> DisplayLine {
    let line = format_tenths(ms);
    match ms {
        Some(ms) if line.len() > width => fit(&format_number(ms / 1000), width),
        _ => fit(&line, width),
    }
}

fn format_number(n: impl core::fmt::Display) -> DisplayLine {
    let mut line = DisplayLine::new();
    let _ = write!(line, "{n}");
    line
}

/// `#` per remaining countdown second, padded to the row width.
pub fn countdown_bar(t0: Millis, now: Millis) -> DisplayLine {
    let len = (t0.saturating_sub(now) / 1000 + 1) as usize;
    let mut line = DisplayLine::new();
    for _ in 0..len.min(DISPLAY_COLS) {
        let _ = line.push('#');
    }
    fit(&line, DISPLAY_COLS)
}

fn print_at(display: &mut dyn TextDisplay, (col, row): (u8, u8), text: &str) {
    display.set_cursor(col, row);
    display.print(text);
}

// ─── Scheduler ──────────────────────────────────────────────────────

/// Result blink sub-schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Blink {
    lane: LaneIndex,
    lit: bool,
    toggled_at: Millis,
}

/// Decides per cycle whether, and what, to redraw.
#[derive(Debug, Clone)]
pub struct DisplayRefreshScheduler {
    force_refresh: bool,
    last_refresh: Millis,
    blink: Option<Blink>,
    backlight: [Option<bool>; LANE_COUNT],
}

impl Default for DisplayRefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayRefreshScheduler {
    /// Starts with a forced refresh pending.
    pub const fn new() -> Self {
        Self {
            force_refresh: true,
            last_refresh: 0,
            blink: None,
            backlight: [None; LANE_COUNT],
        }
    }

    /// Request a full banner redraw on the next cycle. Called on every mode
    /// transition; cancels any blink in progress.
    pub fn force_refresh(&mut self) {
        self.force_refresh = true;
        self.blink = None;
    }

    /// A periodic redraw is due for `kind` at `now`.
    #[inline]
    pub const fn refresh_due(&self, kind: ModeKind, now: Millis) -> bool {
        self.force_refresh || now.saturating_sub(self.last_refresh) >= refresh_interval(kind)
    }

    /// Run the schedule for one cycle.
    pub fn update(
        &mut self,
        now: Millis,
        mode: &RaceMode,
        lanes: &mut LaneTimingEngine,
        sample: &GateSample,
        displays: &mut LaneDisplays,
    ) {
        let kind = mode.kind();
        if self.force_refresh {
            trace!(mode = %kind, "display: full redraw");
            self.force_refresh = false;
            self.last_refresh = now;
            self.apply_backlights(kind, displays);
            draw_banner(now, mode, lanes, sample, displays);
            if let RaceMode::Result { winner, .. } = *mode {
                self.blink = Some(Blink {
                    lane: winner,
                    lit: true,
                    toggled_at: now,
                });
            }
        } else if self.refresh_due(kind, now) {
            self.last_refresh = now;
            draw_periodic(now, mode, lanes, sample, displays);
        }

        if let Some(blink) = self.blink.as_mut() {
            if now.saturating_sub(blink.toggled_at) >= RESULT_BLINK_HALF_PERIOD_MS {
                blink.lit = !blink.lit;
                blink.toggled_at = now;
                let (lane, lit) = (blink.lane, blink.lit);
                self.set_backlight(lane, lit, displays);
            }
        }
    }

    /// Backlights off in Sleep, on everywhere else.
    fn apply_backlights(&mut self, kind: ModeKind, displays: &mut LaneDisplays) {
        let on = kind != ModeKind::Sleep;
        for lane in LaneIndex::ALL {
            self.set_backlight(lane, on, displays);
        }
    }

    fn set_backlight(&mut self, lane: LaneIndex, on: bool, displays: &mut LaneDisplays) {
        let i = lane.index();
        if self.backlight[i] != Some(on) {
            displays[i].set_backlight(on);
            self.backlight[i] = Some(on);
        }
    }
}

// ─── Drawing ────────────────────────────────────────────────────────

fn draw_banner(
    now: Millis,
    mode: &RaceMode,
    lanes: &mut LaneTimingEngine,
    sample: &GateSample,
    displays: &mut LaneDisplays,
) {
    for lane in LaneIndex::ALL {
        let d = displays[lane.index()].as_mut();
        d.clear();
        match *mode {
            RaceMode::Sync { .. } => {
                print_at(d, (0, 0), "Syncing");
                print_at(d, (0, 1), "Sig:");
                draw_signal(d, sample, lane);
            }
            RaceMode::Wait => print_at(d, (0, 0), "Press start"),
            RaceMode::Warmup { t0, .. } => {
                print_at(d, (0, 0), "Get Ready...");
                print_at(d, (0, 1), &countdown_bar(t0, now));
            }
            RaceMode::Run { .. } => {
                print_at(d, (0, 0), "LAP:");
                print_at(d, (7, 0), "Best:");
                print_at(d, (0, 1), "Time:");
                print_at(d, (11, 1), "Pos:");
                lanes.take_dirty(lane);
                draw_lane_fields(d, lanes.lane(lane), LaneDirty::all());
                draw_clock(d, lanes.lane(lane), now);
            }
            RaceMode::FalseStart { offenders, .. } => {
                let text = if offenders[lane.index()] {
                    "FALSE START!"
                } else {
                    "Other lane jumped"
                };
                print_at(d, (0, 0), &fit(text, DISPLAY_COLS));
            }
            RaceMode::Setup { target } => {
                if lane == LaneIndex::Left {
                    print_at(d, (0, 0), "Setup");
                    print_at(d, (0, 1), &setup_line(target));
                }
            }
            RaceMode::Sleep => print_at(d, (0, 0), "Zzzzzzzzzzzz"),
            RaceMode::Result { winner, .. } => {
                let text = if lane == winner { "WINNER!" } else { "Finished 2nd" };
                print_at(d, (0, 0), text);
                print_at(d, (0, 1), "Best:");
                print_at(d, (5, 1), &format_tenths(lanes.lane(lane).best_lap));
            }
        }
    }
}

fn draw_periodic(
    now: Millis,
    mode: &RaceMode,
    lanes: &mut LaneTimingEngine,
    sample: &GateSample,
    displays: &mut LaneDisplays,
) {
    match *mode {
        RaceMode::Sync { .. } => {
            for lane in LaneIndex::ALL {
                draw_signal(displays[lane.index()].as_mut(), sample, lane);
            }
        }
        RaceMode::Wait => {
            for d in displays.iter_mut() {
                d.clear();
                print_at(d.as_mut(), (0, 0), "Press start");
            }
        }
        RaceMode::Warmup { t0, .. } => {
            let bar = countdown_bar(t0, now);
            for d in displays.iter_mut() {
                print_at(d.as_mut(), (0, 1), &bar);
            }
        }
        RaceMode::Run { .. } => {
            for lane in LaneIndex::ALL {
                let dirty = lanes.take_dirty(lane);
                let d = displays[lane.index()].as_mut();
                draw_lane_fields(d, lanes.lane(lane), dirty);
                draw_clock(d, lanes.lane(lane), now);
            }
        }
        RaceMode::Setup { target } => {
            print_at(displays[0].as_mut(), (0, 1), &setup_line(target));
        }
        RaceMode::FalseStart { .. } | RaceMode::Sleep | RaceMode::Result { .. } => {}
    }
}

fn draw_signal(d: &mut dyn TextDisplay, sample: &GateSample, lane: LaneIndex) {
    print_at(d, SIGNAL_AT, &fit(&format_number(sample.raw[lane.index()]), 4));
}

fn draw_lane_fields(d: &mut dyn TextDisplay, lane: &Lane, dirty: LaneDirty) {
    if dirty.contains(LaneDirty::LAP) {
        print_at(d, LAP_COUNT_AT, &fit(&format_number(lane.lap_count), LAP_COUNT_WIDTH));
    }
    if dirty.contains(LaneDirty::BEST_LAP) {
        print_at(d, BEST_AT, &format_time(lane.best_lap, BEST_WIDTH));
    }
    if dirty.contains(LaneDirty::POSITION) {
        print_at(d, POSITION_AT, &format_number(lane.position.rank()));
    }
}

fn draw_clock(d: &mut dyn TextDisplay, lane: &Lane, now: Millis) {
    print_at(
        d,
        CLOCK_AT,
        &format_time(Some(lane.current_lap(now)), CLOCK_WIDTH),
    );
}

fn setup_line(target: u8) -> DisplayLine {
    let mut line = DisplayLine::new();
    let _ = if target == 0 {
        line.push_str("Laps: free").map_err(|_| core::fmt::Error)
    } else {
        write!(line, "Laps: {target}")
    };
    fit(&line, DISPLAY_COLS)
}

// ─── Tests ──────────────────────────────────────────────────────────
