//! Tick engine — the cooperative control loop body.
//!
//! The main loop sleeps to each tick deadline and then calls
//! [`Scheduler::tick`], which runs one fixed sequence of housekeeping
//! against the [`AppService`] and the injected ports.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        one tick                              │
//! │                                                              │
//! │  1. flush dirty intensities (every N ticks) ─▶ ByteStorePort │
//! │  2. render status                           ─▶ StatusPort    │
//! │  3. advance uptime                                           │
//! │  4. uptime > ceiling?  flush, restart       ─▶ SystemPort    │
//! │  5. service one command  CommandPort ─▶ AppService ─▶ reply  │
//! │  6. light heartbeat                         ─▶ ActuatorPort  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{
    ActuatorPort, ByteStorePort, CommandPort, EventSink, StatusPort, SystemPort,
};
use crate::app::service::AppService;
use crate::config::SystemConfig;

/// What a single [`Scheduler::tick`] did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A flush was attempted this tick.
    pub flushed: bool,
    /// The uptime ceiling was crossed and a restart requested.
    pub restarted: bool,
    /// Result of the command serviced this tick, if any.
    pub command_result: Option<i32>,
}

/// Periodic housekeeping driver.
///
/// Owns only timing bookkeeping; all domain state stays in the
/// [`AppService`], which is borrowed for the duration of a tick.
pub struct Scheduler {
    tick_ms: u64,
    uptime_ms: u64,
    restart_after_ms: u64,
    flush_every: u32,
    ticks_since_flush: u32,
}

impl Scheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            tick_ms: u64::from(config.tick_interval_ms),
            uptime_ms: 0,
            restart_after_ms: u64::from(config.restart_after_secs) * 1000,
            flush_every: config.flush_interval_ticks.max(1),
            ticks_since_flush: 0,
        }
    }

    /// Tick period in milliseconds.
    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Accumulated uptime since boot or the last scheduled restart.
    pub fn uptime_secs(&self) -> u64 {
        self.uptime_ms / 1000
    }

    /// Run one tick.  Never fails: every port error is logged and degraded
    /// inside the service or adapter.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        app: &mut AppService,
        hw: &mut impl ActuatorPort,
        store: &mut impl ByteStorePort,
        status: &mut impl StatusPort,
        commands: &mut impl CommandPort,
        system: &mut impl SystemPort,
        sink: &mut impl EventSink,
    ) -> TickReport {
        let mut report = TickReport::default();

        // ── 1/2. Persist, then render ─────────────────────────
        self.ticks_since_flush = self.ticks_since_flush.saturating_add(1);
        if self.ticks_since_flush >= self.flush_every {
            self.ticks_since_flush = 0;
            if app.is_dirty() {
                app.flush_if_dirty(store, sink);
                report.flushed = true;
            }
        }
        status.render(&app.status(self.uptime_secs()));

        // ── 3/4. Uptime and scheduled restart ─────────────────
        self.uptime_ms = self.uptime_ms.saturating_add(self.tick_ms);
        if self.uptime_ms > self.restart_after_ms {
            let uptime_secs = self.uptime_secs();
            info!("Uptime {}s past restart ceiling, restarting", uptime_secs);
            // The restart does not return on the device.
            if app.is_dirty() {
                app.flush_if_dirty(store, sink);
                report.flushed = true;
            }
            sink.emit(&AppEvent::Restarting { uptime_secs });
            system.restart();
            self.uptime_ms = 0;
            report.restarted = true;
        }

        // ── 5. One external command ───────────────────────────
        if let Some(request) = commands.poll() {
            let result = app.dispatch(&request, hw, store, sink);
            commands.reply(&request, result);
            report.command_result = Some(result);
        }

        // ── 6. Heartbeat ──────────────────────────────────────
        app.heartbeat(hw);

        report
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
