//! Race enums shared by the control unit and the hardware seams.
//!
//! `ModeKind` is the payload-free mirror of the control unit's `RaceMode`;
//! it is what gets logged, looked up in refresh tables and reported.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::LANE_COUNT;

// ─── Mode ───────────────────────────────────────────────────────────

/// Race phase without its per-mode data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ModeKind {
    /// Waiting for both gates to read a stable baseline.
    #[default]
    Sync = 0,
    /// Armed, waiting for the operator.
    Wait = 1,
    /// Countdown before the race.
    Warmup = 2,
    /// Live timing.
    Run = 3,
    /// A gate was obstructed during the countdown.
    FalseStart = 4,
    /// Editing the target lap count.
    Setup = 5,
    /// Displays dark after inactivity.
    Sleep = 6,
    /// A lane reached the target lap count.
    Result = 7,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Lanes ──────────────────────────────────────────────────────────

/// One of the two lanes. Index 0 is the left lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LaneIndex {
    Left = 0,
    Right = 1,
}

impl LaneIndex {
    /// Both lanes in evaluation order.
    pub const ALL: [LaneIndex; LANE_COUNT] = [LaneIndex::Left, LaneIndex::Right];

    /// Array index of this lane.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The opposing lane.
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Operators count lanes from 1.
        write!(f, "lane {}", self.index() + 1)
    }
}

/// Race rank of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Position {
    First = 1,
    Second = 2,
}

impl Position {
    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Starting grid: left lane holds rank 1 until overtaken.
    #[inline]
    pub const fn initial(lane: LaneIndex) -> Self {
        match lane {
            LaneIndex::Left => Self::First,
            LaneIndex::Right => Self::Second,
        }
    }
}

// ─── Gate readings & operator input ─────────────────────────────────

/// Classified gate reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GateState {
    /// Beam at baseline, lane empty.
    #[default]
    Clear,
    /// Beam obstructed, vehicle in the gate.
    Blocked,
}

impl GateState {
    #[inline]
    pub const fn is_clear(self) -> bool {
        matches!(self, Self::Clear)
    }

    #[inline]
    pub const fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }
}

/// Classified operator button action, delivered at most once per press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonEvent {
    Click,
    LongPressStart,
}

// ─── Tests ──────────────────────────────────────────────────────────
