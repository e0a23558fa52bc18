//! Time adapters: a monotonic clock for tick deadlines and a blocking
//! [`DelayNs`] for ramp steps.
//!
//! - **`target_os = "espidf"`** — the clock wraps `esp_timer_get_time()`
//!   (microsecond precision, monotonic); delays use
//!   `esp_idf_hal::delay::FreeRtos` at the call site.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` and
//!   `std::thread::sleep` for host-side testing and simulation.

use embedded_hal::delay::DelayNs;

/// Monotonic time since boot.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a read of the RTC-backed counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since construction.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Milliseconds left until `deadline_ms`, zero if it already passed.
    pub fn until(&self, deadline_ms: u64) -> u64 {
        deadline_ms.saturating_sub(self.uptime_ms())
    }
}

/// Blocking delay backed by `std::thread::sleep`.
///
/// Used on the host; on the device FreeRTOS's own delay is preferred
/// because it yields to the scheduler at tick granularity.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
