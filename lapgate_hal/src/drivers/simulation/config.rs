//! Simulation parameters, the optional `[simulation]` table.

use serde::{Deserialize, Serialize};

use lapgate_common::config::ConfigError;
use lapgate_common::consts::{LANE_COUNT, SENSOR_RAW_MAX};
use lapgate_common::hal::Millis;
use lapgate_common::race::state::ButtonEvent;

/// One simulated car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarConfig {
    /// Time for one full circuit.
    pub lap_ms: Millis,
    /// Time the car spends inside the beam.
    pub pass_ms: Millis,
    /// Delay of the first pass after `cars_start_ms`.
    #[serde(default)]
    pub offset_ms: Millis,
}

/// A button event injected at a fixed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedPress {
    pub at_ms: Millis,
    pub event: ButtonEvent,
}

/// ```toml
/// [simulation]
/// cars_start_ms = 9000
/// baseline = 960
/// blocked = 120
/// noise = 8
/// cars = [
///     { lap_ms = 4200, pass_ms = 150 },
///     { lap_ms = 4500, pass_ms = 150, offset_ms = 400 },
/// ]
/// button = [{ at_ms = 3000, event = "Click" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// When the cars first reach the gates.
    pub cars_start_ms: Millis,
    pub cars: [CarConfig; LANE_COUNT],
    /// Beam reading with the lane empty.
    pub baseline: u16,
    /// Beam reading with a car in the gate.
    pub blocked: u16,
    /// Peak deterministic noise added to every reading.
    pub noise: u16,
    pub button: Vec<ScriptedPress>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cars_start_ms: 9000,
            cars: [
                CarConfig {
                    lap_ms: 4200,
                    pass_ms: 150,
                    offset_ms: 0,
                },
                CarConfig {
                    lap_ms: 4500,
                    pass_ms: 150,
                    offset_ms: 400,
                },
            ],
            baseline: 960,
            blocked: 120,
            noise: 8,
            button: vec![ScriptedPress {
                at_ms: 3000,
                event: ButtonEvent::Click,
            }],
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, car) in self.cars.iter().enumerate() {
            if car.pass_ms == 0 || car.pass_ms >= car.lap_ms {
                return Err(ConfigError::ValidationError(format!(
                    "simulation car {i}: pass_ms ({}) must be in 1..lap_ms ({})",
                    car.pass_ms, car.lap_ms
                )));
            }
        }
        if self.baseline > SENSOR_RAW_MAX {
            return Err(ConfigError::ValidationError(format!(
                "simulation baseline {} exceeds {SENSOR_RAW_MAX}",
                self.baseline
            )));
        }
        if self.blocked >= self.baseline {
            return Err(ConfigError::ValidationError(
                "simulation blocked level must be below baseline".to_string(),
            ));
        }
        Ok(())
    }
}
