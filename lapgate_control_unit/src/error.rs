//! Errors raised outside the control cycle, at startup and while loading
//! configuration. The cycle itself never fails; faults there are logged and
//! self-correcting.

use lapgate_common::config::ConfigError;
use thiserror::Error;

/// Errors during control-unit startup.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Configuration could not be loaded or failed validation.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The shutdown handler could not be installed.
    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

// ─── Tests ──────────────────────────────────────────────────────────
