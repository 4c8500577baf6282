//! # LapGate HAL Library
//!
//! Concrete implementations of the hardware seams declared in
//! `lapgate_common::hal`.
//!
//! # Module Structure
//!
//! - [`clock`] - Monotonic millisecond clock
//! - [`store`] - Single-byte file-backed config store
//! - [`drivers`] - Peripheral backends (simulation)
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  lapgate_control_unit                        │
//! │     CycleRunner ──► Box<dyn GateSensors / TextDisplay / …>   │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ lapgate_common::hal traits
//!            ┌───────────────────┼────────────────────┐
//!            ▼                   ▼                    ▼
//!   SimulatedTrack      ConsoleDisplay ×2      FileConfigStore
//!   ScriptedButton      Logging tone/bar/lamp  MonotonicClock
//! ```

pub mod clock;
pub mod drivers;
pub mod store;

pub use crate::clock::MonotonicClock;
pub use crate::drivers::simulation::SimulationConfig;
pub use crate::store::FileConfigStore;
