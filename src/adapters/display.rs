//! Status display adapter — renders a [`StatusSnapshot`] on the 20×4 LCD.
//!
//! The panel is probed once at construction.  If nothing answers, the
//! adapter becomes a silent no-op for the rest of the session; the control
//! loop never notices.
//!
//! ```text
//!  ┌────────────────────┐
//!  │FOG-EFCAFE  01:02:03│  id · uptime
//!  │Fog   75%  Pump  50%│
//!  │Light 30%     ACTIVE│
//!  │fogprop-efcafe      │  network label
//!  └────────────────────┘
//! ```

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

use crate::app::ports::{StatusPort, StatusSnapshot};
use crate::drivers::lcd::{Lcd, COLUMNS, ROWS};

pub type Line = heapless::String<COLUMNS>;

pub struct StatusDisplay<I: I2c, D: DelayNs> {
    lcd: Option<Lcd<I, D>>,
    device_id: Line,
    network_label: Line,
    shown: [Line; ROWS],
}

impl<I: I2c, D: DelayNs> StatusDisplay<I, D> {
    /// Probe the panel at `address`; absent or failing → no-op renderer.
    pub fn probe(bus: I, address: u8, delay: D, device_id: &str, network_label: &str) -> Self {
        let lcd = match Lcd::init(bus, address, delay) {
            Ok(lcd) => {
                info!("Display: 20x4 LCD at 0x{:02X}", address);
                Some(lcd)
            }
            Err((_bus, e)) => {
                warn!("Display: no LCD at 0x{:02X} ({:?}), status output disabled", address, e);
                None
            }
        };
        Self {
            lcd,
            device_id: fitted(device_id),
            network_label: fitted(network_label),
            shown: Default::default(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.lcd.is_some()
    }
}

impl<I: I2c, D: DelayNs> StatusPort for StatusDisplay<I, D> {
    fn render(&mut self, status: &StatusSnapshot) {
        let Some(lcd) = self.lcd.as_mut() else {
            return;
        };
        let lines = format_status_lines(&self.device_id, &self.network_label, status);
        for (row, line) in lines.iter().enumerate() {
            if *line == self.shown[row] {
                continue;
            }
            match lcd.write_row(row, line) {
                Ok(()) => self.shown[row] = line.clone(),
                Err(e) => debug!("Display: row {} write failed ({:?})", row, e),
            }
        }
    }
}

/// Lay out the four panel rows, each padded to the full width so stale
/// characters are overwritten.
pub fn format_status_lines(device_id: &str, network_label: &str, s: &StatusSnapshot) -> [Line; ROWS] {
    let hours = (s.uptime_secs / 3600).min(99);
    let minutes = (s.uptime_secs / 60) % 60;
    let seconds = s.uptime_secs % 60;

    let mut lines: [Line; ROWS] = Default::default();
    let _ = write!(lines[0], "{:<12}{:02}:{:02}:{:02}", device_id, hours, minutes, seconds);
    let _ = write!(lines[1], "Fog  {:>3}%  Pump {:>3}%", s.fog, s.pump);
    let _ = write!(
        lines[2],
        "Light{:>3}%{:>11}",
        s.light,
        if s.any_active { "ACTIVE" } else { "IDLE" }
    );
    let _ = write!(lines[3], "{}", network_label);

    for line in &mut lines {
        while line.push(' ').is_ok() {}
    }
    lines
}

fn fitted(text: &str) -> Line {
    let mut line = Line::new();
    for c in text.chars() {
        if line.push(c).is_err() {
            break;
        }
    }
    line
}
