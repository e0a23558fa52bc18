//! System configuration parameters
//!
//! All tunable parameters for the prop controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::app::commands::PercentPolicy;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop tick period (milliseconds)
    pub tick_interval_ms: u32,
    /// Flush dirty intensities every N ticks
    pub flush_interval_ticks: u32,
    /// Restart the device once accumulated uptime exceeds this (seconds)
    pub restart_after_secs: u32,

    // --- Light ---
    /// Delay between one-percent steps of an on/off ramp (milliseconds)
    pub light_ramp_step_ms: u32,
    /// Run the idle heartbeat sweep while the light is on
    pub heartbeat_enabled: bool,
    /// Delay between heartbeat steps (milliseconds)
    pub heartbeat_step_ms: u32,
    /// Lowest point of the heartbeat, as a percentage of the light level
    pub heartbeat_floor_percent: u8,

    // --- Commands ---
    /// How invalid percent parameters are treated
    pub percent_policy: PercentPolicy,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 1000,     // 1 Hz
            flush_interval_ticks: 1,    // every tick
            restart_after_secs: 86_400, // 24 h

            // Light
            light_ramp_step_ms: 10,
            heartbeat_enabled: true,
            heartbeat_step_ms: 5,
            heartbeat_floor_percent: 50,

            // Commands
            percent_policy: PercentPolicy::Lenient,
        }
    }
}
