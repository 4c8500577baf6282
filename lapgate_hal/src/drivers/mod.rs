//! Peripheral backends.
//!
//! - [`simulation`] - Software track, console displays and logging outputs
//!   for running the controller without hardware.
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `lapgate_common::hal` traits it covers
//! 3. Wire it up in the control unit binary

pub mod simulation;
