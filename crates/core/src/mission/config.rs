//! Mission engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and sizing knobs for mission runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSettings {
    /// Wall-clock limit for a whole run (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Pause after the starting notice (milliseconds).
    /// Gives a live UI a perceptible transition.
    #[serde(default = "default_start_delay")]
    pub start_delay_ms: u64,

    /// Pause after each step's progress notice (milliseconds).
    #[serde(default = "default_step_delay")]
    pub step_delay_ms: u64,

    /// Limit for the narrative summary call (seconds).
    #[serde(default = "default_summary_timeout")]
    pub summary_timeout_secs: u64,

    /// Drivers deep-dived by a coaching sweep when `top_n` is not given.
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Upper bound accepted for `top_n`.
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
}

fn default_timeout() -> u64 {
    90
}

fn default_start_delay() -> u64 {
    800
}

fn default_step_delay() -> u64 {
    600
}

fn default_summary_timeout() -> u64 {
    20
}

fn default_top_n() -> usize {
    5
}

fn default_max_top_n() -> usize {
    25
}

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            start_delay_ms: default_start_delay(),
            step_delay_ms: default_step_delay(),
            summary_timeout_secs: default_summary_timeout(),
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
        }
    }
}

impl MissionSettings {
    /// Settings without pacing pauses, for tests and batch use.
    pub fn unpaced() -> Self {
        Self {
            start_delay_ms: 0,
            step_delay_ms: 0,
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }
}
