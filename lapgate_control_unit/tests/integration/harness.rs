//! Recording fakes and a cycle-stepping bench.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use lapgate_common::consts::DISPLAY_COLS;
use lapgate_common::prelude::*;
use lapgate_control_unit::config::load_config_from_str;
use lapgate_control_unit::cycle::{CycleRunner, Peripherals};
use lapgate_control_unit::state::machine::{TickOutcome, Transition};

pub const CLEAR: u16 = 960;
pub const BLOCKED: u16 = 120;
pub const STEP: Millis = 5;

const CONFIG: &str = r#"
[shared]
service_name = "lapgate-it"
"#;

// ── Fakes ───────────────────────────────────────────────────────────

struct Sensors(Rc<Cell<[u16; 2]>>);

impl GateSensors for Sensors {
    fn read(&mut self, lane: LaneIndex) -> u16 {
        self.0.get()[lane.index()]
    }
}

struct Button(Rc<RefCell<VecDeque<ButtonEvent>>>);

impl ButtonInput for Button {
    fn poll(&mut self) -> Option<ButtonEvent> {
        self.0.borrow_mut().pop_front()
    }
}

/// 16×2 character buffer.
#[derive(Debug)]
pub struct Screen {
    rows: [[char; DISPLAY_COLS]; 2],
    cursor: (usize, usize),
    pub backlight: Option<bool>,
}

impl Screen {
    fn new() -> Self {
        Self {
            rows: [[' '; DISPLAY_COLS]; 2],
            cursor: (0, 0),
            backlight: None,
        }
    }

    pub fn row(&self, row: usize) -> String {
        self.rows[row].iter().collect::<String>().trim_end().to_string()
    }
}

struct Display(Rc<RefCell<Screen>>);

impl TextDisplay for Display {
    fn clear(&mut self) {
        let mut s = self.0.borrow_mut();
        s.rows = [[' '; DISPLAY_COLS]; 2];
        s.cursor = (0, 0);
    }
    fn set_cursor(&mut self, col: u8, row: u8) {
        self.0.borrow_mut().cursor = (col as usize, row as usize);
    }
    fn print(&mut self, text: &str) {
        let mut s = self.0.borrow_mut();
        for c in text.chars() {
            let (col, row) = s.cursor;
            if col < DISPLAY_COLS && row < 2 {
                s.rows[row][col] = c;
            }
            s.cursor.0 += 1;
        }
    }
    fn set_backlight(&mut self, on: bool) {
        self.0.borrow_mut().backlight = Some(on);
    }
}

/// Everything written to the tone, indicator and lamp.
#[derive(Debug, Default)]
pub struct Outputs {
    pub tones: Vec<Option<u16>>,
    pub patterns: Vec<u8>,
    pub lamp: Option<bool>,
}

impl Outputs {
    pub fn tone(&self) -> Option<u16> {
        self.tones.last().copied().flatten()
    }
}

struct Tone(Rc<RefCell<Outputs>>);

impl ToneSource for Tone {
    fn start_tone(&mut self, hz: u16) {
        self.0.borrow_mut().tones.push(Some(hz));
    }
    fn stop_tone(&mut self) {
        self.0.borrow_mut().tones.push(None);
    }
}

struct Bar(Rc<RefCell<Outputs>>);

impl IndicatorBus for Bar {
    fn write_pattern(&mut self, pattern: u8) {
        self.0.borrow_mut().patterns.push(pattern);
    }
}

struct Lamp(Rc<RefCell<Outputs>>);

impl StatusLamp for Lamp {
    fn set(&mut self, on: bool) {
        self.0.borrow_mut().lamp = Some(on);
    }
}

/// Persisted byte plus every write attempt.
#[derive(Debug, Default)]
pub struct StoreState {
    pub value: u8,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub writes: Vec<u8>,
}

struct Store(Rc<RefCell<StoreState>>);

impl ConfigStore for Store {
    fn get(&mut self) -> Result<u8, HalError> {
        let s = self.0.borrow();
        if s.fail_reads {
            return Err(HalError::PersistenceError("read failed".to_string()));
        }
        Ok(s.value)
    }
    fn set(&mut self, value: u8) -> Result<(), HalError> {
        let mut s = self.0.borrow_mut();
        s.writes.push(value);
        if s.fail_writes {
            return Err(HalError::PersistenceError("write failed".to_string()));
        }
        s.value = value;
        Ok(())
    }
}

// ── Bench ───────────────────────────────────────────────────────────

/// A runner on fake hardware, stepped every [`STEP`] ms.
pub struct Bench {
    pub runner: CycleRunner,
    pub now: Millis,
    pub transitions: Vec<Transition>,
    pub outcomes: Vec<(Millis, TickOutcome)>,
    raw: Rc<Cell<[u16; 2]>>,
    button: Rc<RefCell<VecDeque<ButtonEvent>>>,
    screens: [Rc<RefCell<Screen>>; 2],
    pub outputs: Rc<RefCell<Outputs>>,
    pub store: Rc<RefCell<StoreState>>,
}

impl Bench {
    /// Boot at t = 0 with `stored` in the config store.
    pub fn new(stored: u8) -> Self {
        Self::with_store(StoreState {
            value: stored,
            ..StoreState::default()
        })
    }

    pub fn with_store(store: StoreState) -> Self {
        let config = load_config_from_str(CONFIG).expect("test config");
        let raw = Rc::new(Cell::new([CLEAR, CLEAR]));
        let button = Rc::new(RefCell::new(VecDeque::new()));
        let screens = [
            Rc::new(RefCell::new(Screen::new())),
            Rc::new(RefCell::new(Screen::new())),
        ];
        let outputs = Rc::new(RefCell::new(Outputs::default()));
        let store = Rc::new(RefCell::new(store));

        let io = Peripherals {
            sensors: Box::new(Sensors(raw.clone())),
            button: Box::new(Button(button.clone())),
            displays: [
                Box::new(Display(screens[0].clone())),
                Box::new(Display(screens[1].clone())),
            ],
            tone: Box::new(Tone(outputs.clone())),
            indicator: Box::new(Bar(outputs.clone())),
            lamp: Box::new(Lamp(outputs.clone())),
            store: Box::new(Store(store.clone())),
        };

        Self {
            runner: CycleRunner::new(&config, io, 0),
            now: 0,
            transitions: Vec::new(),
            outcomes: Vec::new(),
            raw,
            button,
            screens,
            outputs,
            store,
        }
    }

    pub fn kind(&self) -> ModeKind {
        self.runner.machine().kind()
    }

    pub fn set_raw(&self, lane: LaneIndex, raw: u16) {
        let mut both = self.raw.get();
        both[lane.index()] = raw;
        self.raw.set(both);
    }

    /// One cycle exactly at `at`.
    pub fn step_at(&mut self, at: Millis) {
        self.now = at;
        let out = self.runner.step(at);
        if let Some(t) = out.transition {
            self.transitions.push(t);
        }
        if out != TickOutcome::default() {
            self.outcomes.push((at, out));
        }
    }

    /// Step every [`STEP`] ms up to and including `until`.
    pub fn tick_until(&mut self, until: Millis) {
        while self.now < until {
            let next = (self.now + STEP).min(until);
            self.step_at(next);
        }
    }

    /// Deliver `event` on the cycle at `at`.
    pub fn press_at(&mut self, event: ButtonEvent, at: Millis) {
        if at > self.now + STEP {
            self.tick_until(at - STEP);
        }
        self.button.borrow_mut().push_back(event);
        self.step_at(at);
    }

    /// Boot → Wait. Returns the time Wait was entered.
    pub fn sync(&mut self) -> Millis {
        self.tick_until(2000);
        assert_eq!(self.kind(), ModeKind::Wait);
        self.now
    }

    /// Click at `at`, count down, enter Run. Returns `t0`.
    pub fn start_race(&mut self, at: Millis) -> Millis {
        self.press_at(ButtonEvent::Click, at);
        assert_eq!(self.kind(), ModeKind::Warmup);
        let t0 = at + 4999;
        self.tick_until(t0);
        assert_eq!(self.kind(), ModeKind::Run);
        t0
    }

    /// Car of `lane` in the gate for ~100 ms, leaving at `at`.
    pub fn pass(&mut self, lane: LaneIndex, at: Millis) {
        self.pass_lanes(&[lane], at);
    }

    /// Cars of `lanes` leave their gates on the same cycle.
    pub fn pass_lanes(&mut self, lanes: &[LaneIndex], at: Millis) {
        self.tick_until(at - 100);
        for &lane in lanes {
            self.set_raw(lane, BLOCKED);
        }
        self.tick_until(at - STEP);
        for &lane in lanes {
            self.set_raw(lane, CLEAR);
        }
        self.step_at(at);
    }

    pub fn row(&self, lane: LaneIndex, row: usize) -> String {
        self.screens[lane.index()].borrow().row(row)
    }

    pub fn backlight(&self, lane: LaneIndex) -> Option<bool> {
        self.screens[lane.index()].borrow().backlight
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.transitions.last().copied()
    }
}
