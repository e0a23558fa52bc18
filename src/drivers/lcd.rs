//! HD44780 character LCD behind a PCF8574 I²C backpack (20×4).
//!
//! The backpack exposes the LCD's 4-bit bus on its eight port bits:
//!
//! ```text
//!  P7 P6 P5 P4 | P3  P2  P1  P0
//!  D7 D6 D5 D4 | BL  EN  RW  RS
//! ```
//!
//! Every byte is sent as two nibbles, each latched by pulsing EN.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

pub const COLUMNS: usize = 20;
pub const ROWS: usize = 4;

const RS: u8 = 0b0000_0001;
const EN: u8 = 0b0000_0100;
const BACKLIGHT: u8 = 0b0000_1000;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start address of each row on a 20×4 panel.
const ROW_OFFSETS: [u8; ROWS] = [0x00, 0x40, 0x14, 0x54];

pub struct Lcd<I: I2c, D: DelayNs> {
    bus: I,
    address: u8,
    delay: D,
}

impl<I: I2c, D: DelayNs> Lcd<I, D> {
    /// Probe the backpack and run the 4-bit initialisation sequence.
    ///
    /// Gives the bus back on failure so the caller can decide what to do
    /// without a display.
    pub fn init(mut bus: I, address: u8, mut delay: D) -> Result<Self, (I, I::Error)> {
        if let Err(e) = bus.write(address, &[BACKLIGHT]) {
            return Err((bus, e));
        }
        // Power-on settle time before the first nibble.
        delay.delay_ms(50);
        let mut lcd = Self { bus, address, delay };
        match lcd.init_sequence() {
            Ok(()) => Ok(lcd),
            Err(e) => Err((lcd.bus, e)),
        }
    }

    fn init_sequence(&mut self) -> Result<(), I::Error> {
        // Force 8-bit mode three times, then switch to 4-bit.
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INC)
    }

    pub fn clear(&mut self) -> Result<(), I::Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Write `text` at the start of `row`, truncated to the panel width.
    pub fn write_row(&mut self, row: usize, text: &str) -> Result<(), I::Error> {
        let offset = ROW_OFFSETS[row.min(ROWS - 1)];
        self.command(CMD_SET_DDRAM | offset)?;
        for b in text.bytes().take(COLUMNS) {
            self.write_byte(b, RS)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.write_byte(cmd, 0)
    }

    fn write_byte(&mut self, value: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(value >> 4, mode)?;
        self.write_nibble(value & 0x0F, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I::Error> {
        let data = (nibble << 4) | mode | BACKLIGHT;
        self.bus.write(self.address, &[data | EN, data])?;
        self.delay.delay_us(50);
        Ok(())
    }
}
