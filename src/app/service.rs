//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the [`DeviceState`] and is the only thing that
//! mutates it.  It exposes the orchestrator operations (turn on / off, all
//! on / off, activity query), command dispatch, the batched persistence
//! flush and the light heartbeat.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  CommandRequest ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                     │       AppService       │
//!   ActuatorPort  ◀── │  DeviceState · ramps   │ ◀─▶ ByteStorePort
//!                     └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::SystemConfig;

use super::commands::{normalize_on_percent, Command, CommandRequest, PercentPolicy};
use super::events::AppEvent;
use super::ports::{ActuatorPort, ByteStorePort, EventSink, StatusSnapshot, StoreError};
use super::ramp;
use super::state::{ActuatorKind, DeviceState, Transition, RECORD_LEN};

/// Outcome of [`AppService::flush_if_dirty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing to write.
    Clean,
    /// Every byte written and committed.
    Flushed,
    /// The store refused; state stays dirty.
    Failed(StoreError),
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    state: DeviceState,
    ramp_step_ms: u32,
    heartbeat_enabled: bool,
    heartbeat_step_ms: u32,
    heartbeat_floor_percent: u8,
    percent_policy: PercentPolicy,
}

impl AppService {
    /// Construct the service with everything off.
    pub fn new(config: &SystemConfig) -> Self {
        Self::with_state(config, DeviceState::new())
    }

    fn with_state(config: &SystemConfig, state: DeviceState) -> Self {
        Self {
            state,
            ramp_step_ms: config.light_ramp_step_ms,
            heartbeat_enabled: config.heartbeat_enabled,
            heartbeat_step_ms: config.heartbeat_step_ms,
            heartbeat_floor_percent: config.heartbeat_floor_percent,
            percent_policy: config.percent_policy,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Rebuild the service from the byte store and re-assert every
    /// restored intensity on the outputs.
    ///
    /// Unreadable or out-of-range bytes read as 0; a failing store never
    /// prevents start-up.
    pub fn restore(
        config: &SystemConfig,
        store: &impl ByteStorePort,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Self {
        let mut record = [0u8; RECORD_LEN];
        let mut unreadable = 0usize;
        for (addr, slot) in record.iter_mut().enumerate() {
            match store.read_byte(addr as u16) {
                Ok(byte) => *slot = byte,
                Err(e) => {
                    debug!("restore: address {} unreadable ({})", addr, e);
                    unreadable += 1;
                }
            }
        }
        if unreadable > 0 {
            warn!("restore: {} of {} bytes unreadable, defaulting them to 0", unreadable, RECORD_LEN);
        }

        let mut app = Self::with_state(config, DeviceState::from_record(&record));
        if app.state.is_dirty() {
            warn!("restore: repaired inconsistent record, will rewrite on next flush");
        }

        for kind in ActuatorKind::ALL {
            let level = app.intensity(kind);
            if kind.is_ramped() && level > 0 {
                app.walk(kind, ramp::ramp(0, level), app.ramp_step_ms, hw);
            } else {
                hw.set_output(kind, level);
            }
        }

        sink.emit(&AppEvent::Started {
            fog: app.intensity(ActuatorKind::Fog),
            pump: app.intensity(ActuatorKind::Pump),
            light: app.intensity(ActuatorKind::Light),
            from_store: unreadable == 0,
        });
        info!(
            "AppService restored: fog={}% pump={}% light={}%",
            app.intensity(ActuatorKind::Fog),
            app.intensity(ActuatorKind::Pump),
            app.intensity(ActuatorKind::Light)
        );
        app
    }

    // ── Orchestrator ──────────────────────────────────────────

    /// Assign an intensity (clamped to 100) and assert it on the output.
    /// The light ramps; fog and pump switch immediately.
    pub fn set_intensity(
        &mut self,
        kind: ActuatorKind,
        percent: u8,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> u8 {
        let t = self.state.get_mut(kind).set(percent);
        self.drive(kind, t, hw);

        if t.changed() {
            sink.emit(&AppEvent::IntensityChanged {
                kind,
                from: t.from,
                to: t.to,
                previous: t.previous,
            });
        } else {
            debug!("{}: already at {}%", kind, t.to);
        }
        t.to
    }

    /// Turn an actuator on.
    ///
    /// `None` resumes the last meaningful level (see
    /// [`ActuatorState::resume_level`](super::state::ActuatorState::resume_level)).
    /// An explicit 0 or anything above 100 means full intensity.
    pub fn turn_on(
        &mut self,
        kind: ActuatorKind,
        percent: Option<u32>,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> u8 {
        let level = match percent {
            Some(p) => normalize_on_percent(p),
            None => self.state.get(kind).resume_level(),
        };
        self.set_intensity(kind, level, hw, sink)
    }

    /// Turn an actuator off.  Its previous intensity is kept for resume.
    pub fn turn_off(
        &mut self,
        kind: ActuatorKind,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.set_intensity(kind, 0, hw, sink);
    }

    /// Resume every actuator at its last meaningful level.
    pub fn all_on(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        for kind in ActuatorKind::ALL {
            self.turn_on(kind, None, hw, sink);
        }
    }

    /// Switch every actuator off.
    pub fn all_off(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        for kind in ActuatorKind::ALL {
            self.turn_off(kind, hw, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// True iff any actuator is on.
    pub fn is_any_active(&self) -> bool {
        self.state.is_any_active()
    }

    pub fn intensity(&self, kind: ActuatorKind) -> u8 {
        self.state.get(kind).intensity()
    }

    pub fn previous_intensity(&self, kind: ActuatorKind) -> u8 {
        self.state.get(kind).previous_intensity()
    }

    /// Whether any intensity is waiting to be flushed.
    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    /// Snapshot for the status renderer.
    pub fn status(&self, uptime_secs: u64) -> StatusSnapshot {
        StatusSnapshot {
            fog: self.intensity(ActuatorKind::Fog),
            pump: self.intensity(ActuatorKind::Pump),
            light: self.intensity(ActuatorKind::Light),
            any_active: self.is_any_active(),
            uptime_secs,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Interpret and execute a dispatcher request.  Unknown commands and
    /// (under the strict policy) invalid percents return `-1`.
    pub fn dispatch(
        &mut self,
        request: &CommandRequest,
        hw: &mut impl ActuatorPort,
        store: &impl ByteStorePort,
        sink: &mut impl EventSink,
    ) -> i32 {
        let result = match Command::from_request(request, self.percent_policy) {
            Ok(cmd) => self.handle_command(cmd, hw, store, sink),
            Err(e) => {
                warn!("command '{}' rejected: {}", request.name, e);
                -1
            }
        };
        sink.emit(&AppEvent::CommandHandled {
            name: request.name.clone(),
            result,
        });
        result
    }

    /// Execute a typed command and return its integer result.
    pub fn handle_command(
        &mut self,
        cmd: Command,
        hw: &mut impl ActuatorPort,
        store: &impl ByteStorePort,
        sink: &mut impl EventSink,
    ) -> i32 {
        match cmd {
            Command::TurnOn { kind, percent } => i32::from(self.turn_on(kind, percent, hw, sink)),
            Command::TurnOff(kind) => {
                self.turn_off(kind, hw, sink);
                0
            }
            Command::Status => i32::from(self.is_any_active()),
            Command::AllOn => {
                self.all_on(hw, sink);
                i32::from(self.is_any_active())
            }
            Command::AllOff => {
                self.all_off(hw, sink);
                i32::from(self.is_any_active())
            }
            Command::DumpStore => {
                self.dump_store(store, sink);
                1
            }
        }
    }

    /// Read back and report all six persisted bytes.
    pub fn dump_store(&self, store: &impl ByteStorePort, sink: &mut impl EventSink) {
        let mut bytes = [None; RECORD_LEN];
        for (addr, slot) in bytes.iter_mut().enumerate() {
            *slot = store.read_byte(addr as u16).ok();
        }
        sink.emit(&AppEvent::StoreDump(bytes));
    }

    // ── Persistence ───────────────────────────────────────────

    /// Write every intensity to the store in one batch if anything changed.
    ///
    /// A failure is logged and leaves the state dirty so the next call
    /// retries; in-memory state stays authoritative.
    pub fn flush_if_dirty(
        &mut self,
        store: &mut impl ByteStorePort,
        sink: &mut impl EventSink,
    ) -> FlushOutcome {
        if !self.state.is_dirty() {
            return FlushOutcome::Clean;
        }
        let record = self.state.to_record();
        match write_record(store, &record) {
            Ok(()) => {
                self.state.mark_clean();
                sink.emit(&AppEvent::StoreFlushed(record));
                FlushOutcome::Flushed
            }
            Err(e) => {
                warn!("Intensity flush failed: {}", e);
                sink.emit(&AppEvent::StoreFlushFailed(e));
                FlushOutcome::Failed(e)
            }
        }
    }

    // ── Heartbeat ─────────────────────────────────────────────

    /// One triangular brightness sweep on the light, if it is on.
    /// Output only; the light's intensity is untouched.
    pub fn heartbeat(&self, hw: &mut impl ActuatorPort) {
        if !self.heartbeat_enabled {
            return;
        }
        let level = self.intensity(ActuatorKind::Light);
        if level == 0 {
            return;
        }
        let sweep = ramp::heartbeat(level, self.heartbeat_floor_percent);
        self.walk(ActuatorKind::Light, sweep, self.heartbeat_step_ms, hw);
    }

    // ── Internal ──────────────────────────────────────────────

    /// Assert a transition on the hardware.
    fn drive(&self, kind: ActuatorKind, t: Transition, hw: &mut impl ActuatorPort) {
        if !kind.is_ramped() {
            hw.set_output(kind, t.to);
            return;
        }
        match (t.from, t.to) {
            // Already dark: nothing to fade.
            (0, 0) => hw.set_output(kind, 0),
            // Fade out from the remembered level; logically already 0.
            (_, 0) => self.walk(kind, ramp::ramp(t.previous, 0), self.ramp_step_ms, hw),
            (from, to) => self.walk(kind, ramp::ramp(from, to), self.ramp_step_ms, hw),
        }
    }

    /// Assert each level in turn, holding `step_ms` between levels.
    fn walk(
        &self,
        kind: ActuatorKind,
        levels: impl Iterator<Item = u8>,
        step_ms: u32,
        hw: &mut impl ActuatorPort,
    ) {
        for (i, level) in levels.enumerate() {
            if i > 0 {
                hw.hold_ms(step_ms);
            }
            hw.set_output(kind, level);
        }
    }
}

fn write_record(store: &mut impl ByteStorePort, record: &[u8; RECORD_LEN]) -> Result<(), StoreError> {
    for (addr, byte) in record.iter().enumerate() {
        store.write_byte(addr as u16, *byte)?;
    }
    store.commit()
}
