//! LapGate Common Library
//!
//! Shared constants, race types, configuration loading and hardware seams
//! for all LapGate workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Timing windows, calibration defaults, display geometry
//! - [`config`] - Configuration loading traits and types
//! - [`race`] - Race enums and race configuration
//! - [`hal`] - Hardware seam traits and HAL errors
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod race;
