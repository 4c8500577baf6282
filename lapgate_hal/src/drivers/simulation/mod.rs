//! Simulation backend.
//!
//! Runs the controller on a workstation: two simulated cars lapping the
//! gates, a scripted operator button, displays and outputs that report
//! through `tracing`.

mod button;
mod config;
mod console;
mod outputs;
mod track;

pub use button::ScriptedButton;
pub use config::{CarConfig, ScriptedPress, SimulationConfig};
pub use console::ConsoleDisplay;
pub use outputs::{LoggingIndicator, LoggingLamp, LoggingTone};
pub use track::SimulatedTrack;
