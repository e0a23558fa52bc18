//! GPIO / peripheral pin assignments for the prop controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Actuator outputs (logic-level MOSFET gates, LEDC PWM)
// ---------------------------------------------------------------------------

/// Fog machine trigger / ultrasonic mister supply.
pub const FOG_PWM_GPIO: i32 = 4;
/// Water pump motor.
pub const PUMP_PWM_GPIO: i32 = 5;
/// LED strip.
pub const LIGHT_PWM_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// I²C bus (status LCD backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// PCF8574 backpack default address (A0–A2 open).
pub const LCD_I2C_ADDR: u8 = 0x27;
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  10-bit gives 0 – 1023 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 10;
/// Highest duty value at [`PWM_RESOLUTION_BITS`].
pub const PWM_MAX_DUTY: u32 = (1 << PWM_RESOLUTION_BITS) - 1;
/// LEDC base frequency shared by all three outputs (5 kHz, flicker-free).
pub const PWM_FREQ_HZ: u32 = 5_000;
