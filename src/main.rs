//! Fog / pump / light prop controller — main entry point.
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   NvsAdapter      StatusDisplay   LogEventSink│
//! │  (ActuatorPort)    (ByteStore +    (StatusPort)    (EventSink) │
//! │                     ConfigPort)                                │
//! │  ConsoleCommands   ChipSystem                                  │
//! │  (CommandPort)     (SystemPort)                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  DeviceState · ramps · command dispatch · flush        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (fixed tick: flush · render · uptime · command ·    │
//! │             heartbeat)                                         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use fogprop::adapters::console::{self, ConsoleCommands};
use fogprop::adapters::device_id;
use fogprop::adapters::display::StatusDisplay;
use fogprop::adapters::hardware::HardwareAdapter;
use fogprop::adapters::log_sink::LogEventSink;
use fogprop::adapters::nvs::NvsAdapter;
use fogprop::adapters::system::ChipSystem;
use fogprop::adapters::time::MonotonicClock;
use fogprop::app::ports::{ConfigError, ConfigPort};
use fogprop::app::service::AppService;
use fogprop::config::SystemConfig;
use fogprop::drivers::hw_init;
use fogprop::drivers::watchdog::Watchdog;
use fogprop::pins;
use fogprop::scheduler::Scheduler;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let mac = device_id::read_mac();
    let dev_id = device_id::device_id(&mac);
    let dev_hostname = device_id::hostname(&mac);

    info!("╔══════════════════════════════════════╗");
    info!("║  FogProp v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!("Device ID: {} (hostname: {})", dev_id, dev_hostname);

    // ── 2. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without PWM there is nothing to drive; the watchdog resets us.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::new();
    let peripherals = Peripherals::take()?;

    // ── 3. Config + intensity store ───────────────────────────
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running without persistence", e);
            NvsAdapter::unbacked()
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e @ (ConfigError::Corrupted | ConfigError::ValidationFailed(_))) => {
            warn!("Stored config unusable ({}), rewriting defaults", e);
            let defaults = SystemConfig::default();
            if let Err(e) = nvs.save(&defaults) {
                warn!("Config rewrite failed: {}", e);
            }
            defaults
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(FreeRtos);
    let mut log_sink = LogEventSink::new();
    let mut system = ChipSystem::new();

    // GPIO8 / GPIO9 match pins::I2C_SDA_GPIO / pins::I2C_SCL_GPIO.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )?;
    let mut display = StatusDisplay::probe(i2c, pins::LCD_I2C_ADDR, FreeRtos, &dev_id, &dev_hostname);

    console::spawn_reader()?;
    let mut commands = ConsoleCommands::stdio();

    // ── 5. Restore state and re-assert outputs ────────────────
    let mut app = AppService::restore(&config, &nvs, &mut hw, &mut log_sink);
    let mut sched = Scheduler::new(&config);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut next_tick = clock.uptime_ms();

    loop {
        next_tick += sched.tick_ms();
        let wait = clock.until(next_tick);
        if wait > 0 {
            FreeRtos::delay_ms(wait as u32);
        } else {
            // A long ramp overran the period; don't try to catch up.
            next_tick = clock.uptime_ms();
        }

        sched.tick(
            &mut app,
            &mut hw,
            &mut nvs,
            &mut display,
            &mut commands,
            &mut system,
            &mut log_sink,
        );

        watchdog.feed();
    }
}
