//! Hardware adapter — bridges the PWM outputs to the domain port trait.
//!
//! Owns one [`PwmOutput`] per actuator plus the delay used between ramp
//! steps, exposing them through [`ActuatorPort`].  This is the only module
//! that drives the actuator lines.  On non-espidf targets, the underlying
//! outputs use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;

use crate::app::ports::ActuatorPort;
use crate::app::state::ActuatorKind;
use crate::drivers::hw_init::{LEDC_CH_FOG, LEDC_CH_LIGHT, LEDC_CH_PUMP};
use crate::drivers::output::PwmOutput;

/// Concrete adapter that combines all outputs behind [`ActuatorPort`].
pub struct HardwareAdapter<D: DelayNs> {
    fog: PwmOutput,
    pump: PwmOutput,
    light: PwmOutput,
    delay: D,
}

impl<D: DelayNs> HardwareAdapter<D> {
    /// Outputs on their board channels, all at 0 %.
    pub fn new(delay: D) -> Self {
        Self::with_outputs(
            PwmOutput::new(LEDC_CH_FOG),
            PwmOutput::new(LEDC_CH_PUMP),
            PwmOutput::new(LEDC_CH_LIGHT),
            delay,
        )
    }

    pub fn with_outputs(fog: PwmOutput, pump: PwmOutput, light: PwmOutput, delay: D) -> Self {
        Self {
            fog,
            pump,
            light,
            delay,
        }
    }

    /// Raw duty currently applied to an actuator's channel.
    pub fn duty(&self, kind: ActuatorKind) -> u32 {
        self.line(kind).duty()
    }

    fn line(&self, kind: ActuatorKind) -> &PwmOutput {
        match kind {
            ActuatorKind::Fog => &self.fog,
            ActuatorKind::Pump => &self.pump,
            ActuatorKind::Light => &self.light,
        }
    }

    fn line_mut(&mut self, kind: ActuatorKind) -> &mut PwmOutput {
        match kind {
            ActuatorKind::Fog => &mut self.fog,
            ActuatorKind::Pump => &mut self.pump,
            ActuatorKind::Light => &mut self.light,
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D: DelayNs> ActuatorPort for HardwareAdapter<D> {
    fn set_output(&mut self, kind: ActuatorKind, percent: u8) {
        self.line_mut(kind).set_percent(percent);
    }

    fn hold_ms(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }

    fn output(&self, kind: ActuatorKind) -> u8 {
        self.line(kind).percent()
    }
}
