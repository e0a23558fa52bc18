//! Chip control adapter ([`SystemPort`]).
//!
//! On the device a restart goes through `esp_restart()` and never returns.
//! The simulation backend only counts requests so the loop keeps running.

use log::warn;

use crate::app::ports::SystemPort;

#[derive(Debug, Default)]
pub struct ChipSystem {
    #[cfg(not(target_os = "espidf"))]
    restarts: u32,
}

impl ChipSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart requests seen by the simulation backend.
    #[cfg(not(target_os = "espidf"))]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl SystemPort for ChipSystem {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        warn!("ChipSystem: restarting now");
        esp_idf_hal::reset::restart();
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        warn!("ChipSystem(sim): restart requested");
        self.restarts += 1;
    }
}
