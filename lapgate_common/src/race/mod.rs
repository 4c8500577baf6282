//! Race domain types shared across the workspace.

pub mod config;
pub mod state;
