//! Integration test: full races from Wait through Run to Result.
//!
//! Lap debounce, best lap, live position and the win check, observed
//! through the runner and the lane displays.

use lapgate_common::race::state::ButtonEvent::Click;
use lapgate_common::race::state::LaneIndex::{Left, Right};
use lapgate_common::race::state::{ModeKind, Position};
use lapgate_control_unit::state::machine::{RaceMode, TransitionCause};

use super::harness::*;

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn first_lane_to_target_wins() {
    let mut bench = Bench::new(3);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);

    bench.pass(Left, t0 + 2100);
    bench.pass(Left, t0 + 4300);
    assert_eq!(bench.kind(), ModeKind::Run);
    bench.pass(Left, t0 + 6500);

    assert_eq!(
        *bench.runner.machine().mode(),
        RaceMode::Result {
            winner: Left,
            finished_at: t0 + 6500
        }
    );
    assert_eq!(
        bench.last_transition().map(|t| t.cause),
        Some(TransitionCause::Winner(Left))
    );

    let lane = bench.runner.machine().lanes().lane(Left);
    assert_eq!(lane.lap_count, 3);
    assert_eq!(lane.best_lap, Some(2100));

    assert_eq!(bench.row(Left, 0), "WINNER!");
    assert_eq!(bench.row(Left, 1), "Best:2.1");
    assert_eq!(bench.row(Right, 0), "Finished 2nd");
    assert_eq!(bench.row(Right, 1), "Best:--.-");
    assert_eq!(bench.outputs.borrow().lamp, Some(true));
}

#[test]
fn edges_inside_debounce_window_are_ignored() {
    let mut bench = Bench::new(0);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);

    bench.pass(Left, t0 + 500);
    bench.pass(Left, t0 + 1800);
    let lane = *bench.runner.machine().lanes().lane(Left);
    assert_eq!(lane.lap_count, 0);
    assert_eq!(lane.lap_start, t0);

    bench.pass(Left, t0 + 2100);
    let lane = bench.runner.machine().lanes().lane(Left);
    assert_eq!(lane.lap_count, 1);
    assert_eq!(lane.last_lap, 2100);
}

#[test]
fn simultaneous_laps_keep_ranking() {
    let mut bench = Bench::new(0);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);

    bench.pass_lanes(&[Left, Right], t0 + 2100);
    bench.pass_lanes(&[Left, Right], t0 + 4300);

    let lanes = bench.runner.machine().lanes();
    assert_eq!(lanes.lane(Left).lap_count, 2);
    assert_eq!(lanes.lane(Right).lap_count, 2);
    assert_eq!(lanes.lane(Left).position, Position::First);
    assert_eq!(lanes.lane(Right).position, Position::Second);
}

#[test]
fn overtake_flips_both_positions() {
    let mut bench = Bench::new(0);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);
    assert!(bench.row(Left, 1).ends_with("Pos:1"));
    assert!(bench.row(Right, 1).ends_with("Pos:2"));

    bench.pass(Right, t0 + 2100);
    bench.tick_until(t0 + 2300);
    assert_eq!(bench.runner.machine().lanes().lane(Right).position, Position::First);
    assert!(bench.row(Right, 1).ends_with("Pos:1"));
    assert!(bench.row(Left, 1).ends_with("Pos:2"));

    // Drawing level does not change the ranking.
    bench.pass(Left, t0 + 2500);
    assert_eq!(bench.runner.machine().lanes().lane(Right).position, Position::First);

    bench.pass(Left, t0 + 4600);
    bench.tick_until(t0 + 4800);
    assert_eq!(bench.runner.machine().lanes().lane(Left).position, Position::First);
    assert!(bench.row(Left, 1).ends_with("Pos:1"));
    assert!(bench.row(Right, 1).ends_with("Pos:2"));
}

#[test]
fn unlimited_race_never_finishes() {
    let mut bench = Bench::new(0);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);

    for k in 1..=10 {
        bench.pass(Left, t0 + 2100 * k);
    }
    assert_eq!(bench.kind(), ModeKind::Run);
    assert_eq!(bench.runner.machine().lanes().lane(Left).lap_count, 10);
}

#[test]
fn best_lap_is_fastest_completed_lap() {
    let mut bench = Bench::new(0);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);

    // Laps of 2.6 s, 2.1 s, 2.4 s, 3.0 s.
    for at in [2600, 4700, 7100, 10_100] {
        bench.pass(Left, t0 + at);
    }
    let lane = bench.runner.machine().lanes().lane(Left);
    assert_eq!(lane.best_lap, Some(2100));
    assert_eq!(lane.last_lap, 3000);

    bench.tick_until(t0 + 10_200);
    assert_eq!(bench.row(Left, 0), "LAP:4  Best:2.1");
}

#[test]
fn run_banner_and_start_signals() {
    let mut bench = Bench::new(0);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);

    assert_eq!(bench.row(Left, 0), "LAP:0  Best:--.-");
    assert_eq!(bench.row(Left, 1), "Time:0.0   Pos:1");

    {
        let out = bench.outputs.borrow();
        // Countdown bar went from five segments down to one.
        assert!(out.patterns.contains(&62));
        assert!(out.patterns.contains(&32));
        assert_eq!(out.patterns.last(), Some(&0));
        assert_eq!(out.tone(), Some(2000));
        assert_eq!(out.lamp, Some(false));
    }

    bench.tick_until(t0 + 1000);
    assert_eq!(bench.outputs.borrow().tone(), None);
}

#[test]
fn click_after_result_starts_rematch() {
    let mut bench = Bench::new(1);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);
    bench.pass(Right, t0 + 2200);
    assert_eq!(bench.kind(), ModeKind::Result);

    let t1 = bench.start_race(t0 + 4000);
    assert_eq!(*bench.runner.machine().mode(), RaceMode::Run { t0: t1 });
    let lanes = bench.runner.machine().lanes();
    assert_eq!(lanes.lane(Right).lap_count, 0);
    assert_eq!(lanes.lane(Right).best_lap, None);
    assert_eq!(lanes.lane(Right).lap_start, t1);
    assert_eq!(lanes.lane(Right).position, Position::Second);
    assert_eq!(bench.backlight(Right), Some(true));
}

#[test]
fn click_during_run_restarts_countdown() {
    let mut bench = Bench::new(0);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);
    bench.pass(Left, t0 + 2100);

    bench.press_at(Click, t0 + 3000);
    assert_eq!(
        *bench.runner.machine().mode(),
        RaceMode::Warmup {
            t0: t0 + 3000 + 4999,
            false_started: [false; 2]
        }
    );
}
