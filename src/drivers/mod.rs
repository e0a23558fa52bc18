//! Output drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod lcd;
pub mod output;
pub mod task_pin;
pub mod watchdog;
