//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                   |
//! |-------------|----------------|-------------------------------|
//! | `hardware`  | ActuatorPort   | LEDC PWM (fog, pump, light)   |
//! | `nvs`       | ByteStorePort  | NVS / in-memory store         |
//! |             | ConfigPort     |                               |
//! | `display`   | StatusPort     | HD44780 20x4 LCD over I²C     |
//! | `console`   | CommandPort    | Serial console line reader    |
//! | `log_sink`  | EventSink      | Serial log output             |
//! | `system`    | SystemPort     | Chip restart                  |
//! | `time`      | (DelayNs)      | ESP32 system timer / sleep    |

pub mod console;
pub mod device_id;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod system;
pub mod time;
