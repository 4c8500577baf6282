//! Integration test: target lap count editing and persistence.

use lapgate_common::race::state::ButtonEvent::{Click, LongPressStart};
use lapgate_common::race::state::LaneIndex::{Left, Right};
use lapgate_common::race::state::ModeKind;
use lapgate_control_unit::state::machine::{RaceMode, TransitionCause};

use super::harness::*;

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn long_press_edits_and_confirm_persists() {
    let mut bench = Bench::new(3);
    bench.sync();

    bench.press_at(LongPressStart, 2100);
    assert_eq!(*bench.runner.machine().mode(), RaceMode::Setup { target: 3 });
    assert_eq!(bench.row(Left, 0), "Setup");
    assert_eq!(bench.row(Left, 1), "Laps: 3");
    assert_eq!(bench.row(Right, 0), "");

    bench.press_at(Click, 2200);
    bench.press_at(Click, 2300);
    bench.tick_until(2500);
    assert_eq!(*bench.runner.machine().mode(), RaceMode::Setup { target: 5 });
    assert_eq!(bench.row(Left, 1), "Laps: 5");
    // Clicks inside Setup only edit.
    assert_eq!(bench.transitions.len(), 2);

    bench.press_at(LongPressStart, 2600);
    assert_eq!(bench.kind(), ModeKind::Wait);
    assert_eq!(
        bench.last_transition().map(|t| t.cause),
        Some(TransitionCause::LongPress)
    );
    assert_eq!(bench.runner.machine().race_config().target_laps(), 5);

    let store = bench.store.borrow();
    assert_eq!(store.writes, vec![5]);
    assert_eq!(store.value, 5);
}

#[test]
fn editing_past_twenty_wraps_to_free() {
    let mut bench = Bench::new(20);
    bench.sync();

    bench.press_at(LongPressStart, 2100);
    bench.press_at(Click, 2200);
    bench.tick_until(2400);
    assert_eq!(bench.row(Left, 1), "Laps: free");

    bench.press_at(LongPressStart, 2500);
    assert!(bench.runner.machine().race_config().is_unlimited());
    assert_eq!(bench.store.borrow().writes, vec![0]);
}

#[test]
fn failed_write_still_applies_target() {
    let mut bench = Bench::with_store(StoreState {
        value: 3,
        fail_writes: true,
        ..StoreState::default()
    });
    bench.sync();

    bench.press_at(LongPressStart, 2100);
    bench.press_at(Click, 2200);
    bench.press_at(LongPressStart, 2300);

    assert_eq!(bench.kind(), ModeKind::Wait);
    assert_eq!(bench.runner.machine().race_config().target_laps(), 4);
    let store = bench.store.borrow();
    assert_eq!(store.writes, vec![4]);
    assert_eq!(store.value, 3);
}

#[test]
fn out_of_range_stored_target_is_clamped() {
    let bench = Bench::new(0xFF);
    assert_eq!(bench.runner.machine().race_config().target_laps(), 20);
}

#[test]
fn unreadable_store_races_without_limit() {
    let mut bench = Bench::with_store(StoreState {
        fail_reads: true,
        ..StoreState::default()
    });
    assert!(bench.runner.machine().race_config().is_unlimited());
    bench.sync();
}

#[test]
fn leaving_setup_without_confirm_discards_edit() {
    let mut bench = Bench::new(3);
    bench.sync();

    bench.press_at(LongPressStart, 2100);
    bench.press_at(Click, 2200);
    bench.tick_until(2300);
    bench.set_raw(Left, BLOCKED);
    bench.tick_until(7300);
    assert_eq!(bench.kind(), ModeKind::Setup);

    bench.step_at(7305);
    assert_eq!(
        bench.last_transition().map(|t| t.cause),
        Some(TransitionCause::GateLost(Left))
    );
    assert_eq!(bench.runner.machine().race_config().target_laps(), 3);
    assert!(bench.store.borrow().writes.is_empty());
}

#[test]
fn long_press_abandons_running_race() {
    let mut bench = Bench::new(3);
    let wait = bench.sync();
    let t0 = bench.start_race(wait + 1);
    bench.pass(Left, t0 + 2100);

    bench.press_at(LongPressStart, t0 + 3000);
    assert_eq!(*bench.runner.machine().mode(), RaceMode::Setup { target: 3 });
    bench.press_at(LongPressStart, t0 + 3100);
    assert_eq!(bench.kind(), ModeKind::Wait);
    assert_eq!(bench.store.borrow().writes, vec![3]);
}
