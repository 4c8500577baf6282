//! # LapGate Control Unit Library
//!
//! Race-control engine for a two-lane infrared lap timer. One cooperative
//! control cycle samples both gates, advances the race state machine,
//! drives the signal outputs and schedules display redraws.
//!
//! ## Cycle Order
//!
//! 1. **sensor**: sample both lanes, classify, track gate health
//! 2. **state::machine**: gate-lost, button, sleep, then mode logic
//! 3. **signals**: tone, indicator bar, start-button lamp
//! 4. **display**: per-mode refresh schedule and dirty-field redraw
//!
//! ## No Heap In The Cycle
//!
//! Lanes live in a fixed `[Lane; 2]`, display rows are
//! `heapless::String<16>`. Hardware is reached only through the trait seams
//! in `lapgate_common::hal`.

pub mod config;
pub mod cycle;
pub mod display;
pub mod error;
pub mod lane;
pub mod sensor;
pub mod signals;
pub mod state;
