//! Percent-driven PWM output (one LEDC channel per actuator).
//!
//! A dumb actuator: it maps 0–100 % onto the channel's duty range and
//! remembers what it last asserted.  Ramping and persistence live in the
//! application core.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct PwmOutput {
    channel: u32,
    max_duty: u32,
    percent: u8,
}

impl PwmOutput {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            max_duty: pins::PWM_MAX_DUTY,
            percent: 0,
        }
    }

    pub fn set_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        hw_init::ledc_set(self.channel, scale_percent(percent, self.max_duty));
        self.percent = percent;
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn duty(&self) -> u32 {
        scale_percent(self.percent, self.max_duty)
    }
}

/// Linear percent → duty mapping; 100 % is exactly `max_duty`.
pub fn scale_percent(percent: u8, max_duty: u32) -> u32 {
    u32::from(percent.min(100)) * max_duty / 100
}
