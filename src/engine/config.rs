//! Tunables for playback timing, collisions and bubbles.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cadence of the playback loop.
    pub tick_interval_ms: u64,
    /// Axis-aligned proximity below which two sprites collide.
    pub collision_distance: f64,
    /// How long a colliding pair stays highlighted.
    pub highlight_ms: u64,
    /// Duration of a say/think block without `seconds`.
    pub default_bubble_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tick_interval_ms: 500,
            collision_distance: 40.0,
            highlight_ms: 600,
            default_bubble_seconds: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        // A zero interval would make a repeating timer fire forever.
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}
