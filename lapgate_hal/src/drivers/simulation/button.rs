//! Operator button replaying a fixed script.

use std::collections::VecDeque;

use tracing::info;

use lapgate_common::hal::{ButtonInput, Clock};
use lapgate_common::race::state::ButtonEvent;

use super::config::ScriptedPress;

/// Emits each scripted press once, on the first poll at or after its time.
#[derive(Debug, Clone)]
pub struct ScriptedButton<C> {
    clock: C,
    pending: VecDeque<ScriptedPress>,
}

impl<C: Clock> ScriptedButton<C> {
    pub fn new(script: &[ScriptedPress], clock: C) -> Self {
        let mut sorted = script.to_vec();
        sorted.sort_by_key(|p| p.at_ms);
        Self {
            clock,
            pending: sorted.into(),
        }
    }

    /// Presses not yet delivered.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl<C: Clock> ButtonInput for ScriptedButton<C> {
    fn poll(&mut self) -> Option<ButtonEvent> {
        let now = self.clock.now_ms();
        if self.pending.front()?.at_ms > now {
            return None;
        }
        let press = self.pending.pop_front()?;
        info!("Simulated button: {:?} at {} ms", press.event, now);
        Some(press.event)
    }
}
