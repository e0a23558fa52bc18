//! Integration tests: command dispatch → AppService → actuator outputs.

use crate::mock_hw::{LogSink, MockHardware, MockStore, OutputCall};

use fogprop::app::commands::{CommandRequest, PercentPolicy};
use fogprop::app::events::AppEvent;
use fogprop::app::ports::ActuatorPort;
use fogprop::app::service::AppService;
use fogprop::app::state::ActuatorKind;
use fogprop::config::SystemConfig;

struct Rig {
    app: AppService,
    hw: MockHardware,
    store: MockStore,
    sink: LogSink,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    fn with_config(config: SystemConfig) -> Self {
        Self {
            app: AppService::new(&config),
            hw: MockHardware::new(),
            store: MockStore::new(),
            sink: LogSink::new(),
        }
    }

    fn send(&mut self, line: &str) -> i32 {
        let req = CommandRequest::parse_line(line).expect("non-blank command");
        self.app.dispatch(&req, &mut self.hw, &self.store, &mut self.sink)
    }

    fn levels(&self, kind: ActuatorKind) -> (u8, u8) {
        (self.app.intensity(kind), self.app.previous_intensity(kind))
    }
}

// ── Intensity laws ────────────────────────────────────────────

#[test]
fn every_percent_sets_current_and_previous() {
    let mut rig = Rig::new();
    for kind in ActuatorKind::ALL {
        for p in 1..=100u8 {
            rig.app.set_intensity(kind, p, &mut rig.hw, &mut rig.sink);
            assert_eq!(rig.levels(kind), (p, p), "{kind} at {p}");
            assert_eq!(rig.hw.output(kind), p);
        }
    }
}

#[test]
fn zero_keeps_previous() {
    let mut rig = Rig::new();
    rig.send("pumpOn 42");
    rig.send("pumpOff");
    assert_eq!(rig.levels(ActuatorKind::Pump), (0, 42));
}

#[test]
fn turn_off_is_idempotent() {
    let mut rig = Rig::new();
    rig.send("fogOn 30");
    assert_eq!(rig.send("fogOff"), 0);
    let after_once = rig.levels(ActuatorKind::Fog);
    let events_once = rig.sink.events.len();

    assert_eq!(rig.send("fogOff"), 0);
    assert_eq!(rig.levels(ActuatorKind::Fog), after_once);
    let changes = rig.sink.count(|e| matches!(e, AppEvent::IntensityChanged { .. }));
    assert_eq!(changes, 2);
    // Only the CommandHandled event is new.
    assert_eq!(rig.sink.events.len(), events_once + 1);
}

#[test]
fn resume_restores_previous_level() {
    let mut rig = Rig::new();
    rig.send("fogOn 75");
    rig.send("fogOff");
    assert_eq!(rig.send("fogOn"), 75);
    assert_eq!(rig.levels(ActuatorKind::Fog), (75, 75));
}

#[test]
fn resume_with_no_history_is_full() {
    let mut rig = Rig::new();
    assert_eq!(rig.send("pumpOn"), 100);
}

#[test]
fn zero_and_overflow_mean_full() {
    let mut rig = Rig::new();
    assert_eq!(rig.send("fogOn 0"), 100);
    rig.send("fogOff");
    assert_eq!(rig.send("fogOn 150"), 100);
    assert_eq!(rig.send("pumpOn garbage"), 100);
    assert_eq!(rig.send("ledOn 75abc"), 75);
}

#[test]
fn strict_policy_rejects_without_change() {
    let mut rig = Rig::with_config(SystemConfig {
        percent_policy: PercentPolicy::Strict,
        ..Default::default()
    });
    assert_eq!(rig.send("fogOn 150"), -1);
    assert_eq!(rig.send("fogOn abc"), -1);
    assert!(!rig.app.is_any_active());
    assert!(!rig.app.is_dirty());
    assert_eq!(rig.send("fogOn 60"), 60);
}

// ── Orchestrator ──────────────────────────────────────────────

#[test]
fn all_off_then_all_on_restores_each_level() {
    let mut rig = Rig::new();
    rig.send("fogOn 75");
    rig.send("pumpOn 50");
    rig.send("ledOn 30");

    assert_eq!(rig.send("homebridgeOff"), 0);
    assert_eq!(rig.levels(ActuatorKind::Fog), (0, 75));
    assert_eq!(rig.levels(ActuatorKind::Pump), (0, 50));
    assert_eq!(rig.levels(ActuatorKind::Light), (0, 30));
    assert_eq!(rig.send("homebridgeStatus"), 0);

    assert_eq!(rig.send("homebridgeOn"), 1);
    assert_eq!(rig.app.intensity(ActuatorKind::Fog), 75);
    assert_eq!(rig.app.intensity(ActuatorKind::Pump), 50);
    assert_eq!(rig.app.intensity(ActuatorKind::Light), 30);
    assert_eq!(rig.send("homebridgeStatus"), 1);
}

#[test]
fn all_on_from_fresh_is_full() {
    let mut rig = Rig::new();
    rig.send("homebridgeOn");
    for kind in ActuatorKind::ALL {
        assert_eq!(rig.levels(kind), (100, 100));
    }
}

#[test]
fn any_active_tracks_each_actuator() {
    let mut rig = Rig::new();
    assert!(!rig.app.is_any_active());
    for (on, off) in [("fogOn", "fogOff"), ("pumpOn", "pumpOff"), ("ledOn 5", "ledOff")] {
        rig.send(on);
        assert!(rig.app.is_any_active(), "{on}");
        rig.send(off);
        assert!(!rig.app.is_any_active(), "{off}");
    }
}

// ── Light ramps ───────────────────────────────────────────────

#[test]
fn light_ramps_between_levels() {
    let mut rig = Rig::new();
    rig.send("ledOn 5");
    assert_eq!(rig.hw.levels_of(ActuatorKind::Light), vec![0, 1, 2, 3, 4, 5]);

    rig.hw.clear();
    rig.send("ledOn 2");
    assert_eq!(rig.hw.levels_of(ActuatorKind::Light), vec![5, 4, 3, 2]);

    rig.hw.clear();
    rig.send("ledOff");
    assert_eq!(rig.hw.levels_of(ActuatorKind::Light), vec![2, 1, 0]);
}

#[test]
fn ramp_steps_are_paced() {
    let config = SystemConfig::default();
    let mut rig = Rig::with_config(config.clone());
    rig.send("ledOn 3");
    let holds: Vec<u32> = rig
        .hw
        .calls
        .iter()
        .filter_map(|c| match c {
            OutputCall::Hold(ms) => Some(*ms),
            OutputCall::Set(..) => None,
        })
        .collect();
    assert_eq!(holds, vec![config.light_ramp_step_ms; 3]);
}

#[test]
fn fog_and_pump_switch_in_one_step() {
    let mut rig = Rig::new();
    rig.send("fogOn 80");
    rig.send("pumpOn 20");
    assert_eq!(
        rig.hw.calls,
        vec![
            OutputCall::Set(ActuatorKind::Fog, 80),
            OutputCall::Set(ActuatorKind::Pump, 20),
        ]
    );
}

// ── Dispatcher ────────────────────────────────────────────────

#[test]
fn unknown_commands_return_minus_one() {
    let mut rig = Rig::new();
    assert_eq!(rig.send("smokeOn 50"), -1);
    assert_eq!(rig.send("fog"), -1);
    assert!(!rig.app.is_any_active());
}

#[test]
fn command_names_ignore_case() {
    let mut rig = Rig::new();
    assert_eq!(rig.send("FOGON 10"), 10);
    assert_eq!(rig.send("HomeBridgeStatus"), 1);
}

#[test]
fn dump_store_reports_all_six_bytes() {
    let mut rig = Rig::new();
    rig.store = MockStore::with_record([75, 75, 0, 50, 30, 30]);
    assert_eq!(rig.send("dumpStore"), 1);
    assert!(rig.sink.events.contains(&AppEvent::StoreDump([
        Some(75),
        Some(75),
        Some(0),
        Some(50),
        Some(30),
        Some(30)
    ])));
}

#[test]
fn every_dispatch_is_reported() {
    let mut rig = Rig::new();
    rig.send("pumpOn 10");
    rig.send("nope");
    let results: Vec<i32> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CommandHandled { result, .. } => Some(*result),
            _ => None,
        })
        .collect();
    assert_eq!(results, vec![10, -1]);
}
